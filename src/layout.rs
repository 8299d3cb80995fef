//! Force-directed layout pass.
//!
//! Wraps the `force_graph` physics simulation. The simulation runs for a fixed
//! number of steps when the topology structurally changes and is then thrown
//! away; between rebuilds nothing ticks, so nodes stay where they were placed.
//!
//! Device wrappers are compounds around exactly one device. They are not
//! simulated themselves: each takes its child's position and the renderer
//! places the category label above it.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{GraphModel, INTERNET_ID, NodeKind};

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// The point `distance` away in direction `angle` (radians).
	pub fn offset(self, angle: f64, distance: f64) -> Self {
		Self::new(self.x + distance * angle.cos(), self.y + distance * angle.sin())
	}
}

/// Node id to position.
pub type Positions = HashMap<String, Point>;

/// Something that can place every node of a model.
pub trait LayoutEngine {
	/// Compute positions for every node in `model`, wrappers included.
	fn layout(&mut self, model: &GraphModel) -> Positions;
}

/// Simulation tuning.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Simulation steps per layout pass.
	pub iterations: usize,
	/// Seconds advanced per step.
	pub time_step: f32,
	/// Node repulsion.
	pub repulsion: f32,
	pub spring: f32,
	pub max_force: f32,
	pub node_speed: f32,
	pub damping: f32,
	/// Distance used to seed rings around each anchor.
	pub ideal_edge_length: f64,
	/// Margin kept around the graph when fitting the viewport.
	pub padding: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			iterations: 600,
			time_step: 0.016,
			repulsion: 250.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			ideal_edge_length: 130.0,
			padding: 50.0,
		}
	}
}

/// Layout backed by the `force_graph` simulation.
#[derive(Clone, Debug, Default)]
pub struct ForceLayout {
	config: LayoutConfig,
}

impl ForceLayout {
	pub fn new(config: LayoutConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}
}

impl LayoutEngine for ForceLayout {
	fn layout(&mut self, model: &GraphModel) -> Positions {
		let seeds = seed_positions(model, self.config.ideal_edge_length);

		let mut graph: ForceGraph<String, ()> = ForceGraph::new(SimulationParameters {
			force_charge: self.config.repulsion,
			force_spring: self.config.spring,
			force_max: self.config.max_force,
			node_speed: self.config.node_speed,
			damping_factor: self.config.damping,
		});
		let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();

		for node in model.nodes.iter().filter(|n| simulated(&n.kind)) {
			let seed = seeds.get(&node.id).copied().unwrap_or_default();
			let idx = graph.add_node(NodeData {
				x: seed.x as f32,
				y: seed.y as f32,
				mass: 10.0,
				// Pin the internet so the diagram stays centred on it.
				is_anchor: node.id == INTERNET_ID,
				user_data: node.id.clone(),
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		for edge in &model.edges {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(edge.source.as_str()),
				id_to_idx.get(edge.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		for _ in 0..self.config.iterations {
			graph.update(self.config.time_step);
		}
		debug!(
			"net-topology-graph: force layout settled {} nodes in {} iterations",
			id_to_idx.len(),
			self.config.iterations
		);

		let mut positions = Positions::with_capacity(model.nodes.len());
		graph.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.clone(),
				Point::new(node.x() as f64, node.y() as f64),
			);
		});
		attach_wrappers(model, &mut positions);
		positions
	}
}

fn simulated(kind: &NodeKind) -> bool {
	match kind {
		NodeKind::Internet | NodeKind::Network(_) | NodeKind::Device(_) => true,
		NodeKind::DeviceWrapper { .. } => false,
	}
}

/// Give every wrapper the position of its child.
pub fn attach_wrappers(model: &GraphModel, positions: &mut Positions) {
	for node in &model.nodes {
		if let NodeKind::DeviceWrapper { child } = &node.kind {
			if let Some(&point) = positions.get(child) {
				positions.insert(node.id.clone(), point);
			}
		}
	}
}

/// Deterministic starting layout: internet at the origin, networks on a ring
/// around it, devices on a ring around the first node they link to.
pub fn seed_positions(model: &GraphModel, spacing: f64) -> Positions {
	let mut positions = Positions::new();
	positions.insert(INTERNET_ID.to_string(), Point::default());

	let networks: Vec<&str> = model
		.nodes
		.iter()
		.filter(|n| matches!(n.kind, NodeKind::Network(_)))
		.map(|n| n.id.as_str())
		.collect();
	for (i, id) in networks.iter().enumerate() {
		let angle = i as f64 * 2.0 * PI / networks.len() as f64;
		positions.insert(id.to_string(), Point::default().offset(angle, spacing * 2.0));
	}

	let mut ring_counts: HashMap<String, usize> = HashMap::new();
	let devices = model
		.nodes
		.iter()
		.filter(|n| matches!(n.kind, NodeKind::Device(_)));
	for (i, device) in devices.enumerate() {
		let anchor = model
			.edges
			.iter()
			.filter(|e| e.source == device.id)
			.map(|e| e.target.as_str())
			.find(|target| positions.contains_key(*target) && *target != INTERNET_ID);
		let point = match anchor {
			Some(anchor) => {
				let slot = ring_counts.entry(anchor.to_string()).or_insert(0);
				let angle = *slot as f64 * 0.9;
				*slot += 1;
				positions[anchor].offset(angle, spacing)
			}
			None => Point::default().offset(i as f64 * 0.7, spacing * 3.0),
		};
		positions.insert(device.id.clone(), point);
	}

	attach_wrappers(model, &mut positions);
	positions
}
