//! The live rendered graph: model elements with fixed positions.
//!
//! A [`Scene`] is created by a structural rebuild and afterwards only patched
//! in place. Patching never moves an existing node.

use std::collections::{HashMap, HashSet};

use crate::layout::{Point, Positions};
use crate::model::{GraphEdge, GraphModel, GraphNode, INTERNET_ID, NodeKind};

/// Node footprint in graph units, shared by hit-testing and drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGeometry {
	pub internet_size: (f64, f64),
	pub network_size: (f64, f64),
	pub device_radius: f64,
	/// Height of one line of a wrapper's category label.
	pub label_line_height: f64,
	pub label_width: f64,
}

impl Default for NodeGeometry {
	fn default() -> Self {
		Self {
			internet_size: (90.0, 55.0),
			network_size: (130.0, 62.0),
			device_radius: 26.0,
			label_line_height: 13.0,
			label_width: 120.0,
		}
	}
}

/// Axis-aligned box in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn centered(center: Point, width: f64, height: f64) -> Self {
		Self {
			min: Point::new(center.x - width / 2.0, center.y - height / 2.0),
			max: Point::new(center.x + width / 2.0, center.y + height / 2.0),
		}
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}

	pub fn union(self, other: Bounds) -> Bounds {
		Bounds {
			min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
			max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
		}
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..5.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub const MIN_ZOOM: f64 = 0.1;
	pub const MAX_ZOOM: f64 = 5.0;

	/// Transform that shows `bounds` inside a `width` x `height` viewport.
	pub fn fit(bounds: Bounds, width: f64, height: f64, padding: f64) -> Self {
		let avail_w = (width - 2.0 * padding).max(1.0);
		let avail_h = (height - 2.0 * padding).max(1.0);
		let k = (avail_w / bounds.width().max(1.0))
			.min(avail_h / bounds.height().max(1.0))
			.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
		let cx = (bounds.min.x + bounds.max.x) / 2.0;
		let cy = (bounds.min.y + bounds.max.y) / 2.0;
		Self {
			x: width / 2.0 - cx * k,
			y: height / 2.0 - cy * k,
			k,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// A model node pinned at a position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub node: GraphNode,
	pub pos: Point,
}

/// Counts of what an attribute patch touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
	pub updated_nodes: usize,
	pub added_nodes: usize,
	pub removed_nodes: usize,
	pub updated_edges: usize,
	pub added_edges: usize,
	pub removed_edges: usize,
}

impl PatchStats {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Rendered graph: positioned nodes plus classified edges.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<SceneNode>,
	index: HashMap<String, usize>,
	edges: Vec<GraphEdge>,
	geometry: NodeGeometry,
	spacing: f64,
}

impl Scene {
	/// Place every model node. Nodes missing from `positions` sit at the origin.
	pub fn new(model: GraphModel, positions: &Positions, geometry: NodeGeometry, spacing: f64) -> Self {
		let nodes = model
			.nodes
			.into_iter()
			.map(|node| {
				let pos = positions.get(&node.id).copied().unwrap_or_default();
				SceneNode { node, pos }
			})
			.collect();
		let mut scene = Self {
			nodes,
			index: HashMap::new(),
			edges: model.edges,
			geometry,
			spacing,
		};
		scene.reindex();
		scene
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.node.id.clone(), i))
			.collect();
	}

	pub fn nodes(&self) -> &[SceneNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn geometry(&self) -> &NodeGeometry {
		&self.geometry
	}

	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn position(&self, id: &str) -> Option<Point> {
		self.node(id).map(|n| n.pos)
	}

	/// Snapshot of every node position.
	pub fn positions(&self) -> Positions {
		self.nodes
			.iter()
			.map(|n| (n.node.id.clone(), n.pos))
			.collect()
	}

	/// Effective opacity of a node: devices inherit their wrapper's.
	pub fn opacity(&self, node: &GraphNode) -> f64 {
		node.parent
			.as_deref()
			.and_then(|parent| self.node(parent))
			.map_or(node.opacity, |wrapper| wrapper.node.opacity * node.opacity)
	}

	/// Hit box of a node; `None` for wrappers with no label to show.
	pub fn bounds_of(&self, scene_node: &SceneNode) -> Option<Bounds> {
		let g = &self.geometry;
		let pos = scene_node.pos;
		match &scene_node.node.kind {
			NodeKind::Internet => Some(Bounds::centered(pos, g.internet_size.0, g.internet_size.1)),
			NodeKind::Network(_) => Some(Bounds::centered(pos, g.network_size.0, g.network_size.1)),
			NodeKind::Device(_) => {
				let d = g.device_radius * 2.0;
				Some(Bounds::centered(pos, d, d))
			}
			NodeKind::DeviceWrapper { .. } => {
				let lines = label_lines(&scene_node.node.label);
				if lines == 0 {
					return None;
				}
				let height = lines as f64 * g.label_line_height;
				let bottom = pos.y - g.device_radius - 4.0;
				Some(Bounds {
					min: Point::new(pos.x - g.label_width / 2.0, bottom - height),
					max: Point::new(pos.x + g.label_width / 2.0, bottom),
				})
			}
		}
	}

	/// Extent of everything drawn, or `None` for an empty scene.
	pub fn bounds(&self) -> Option<Bounds> {
		self.nodes
			.iter()
			.filter_map(|n| self.bounds_of(n))
			.reduce(Bounds::union)
	}

	/// Topmost node under a graph-space point.
	///
	/// Devices win over their wrapper's label, which wins over networks and
	/// the internet anchor.
	pub fn node_at(&self, p: Point) -> Option<&SceneNode> {
		let r2 = self.geometry.device_radius.powi(2);
		let device = self.nodes.iter().rev().find(|n| {
			matches!(n.node.kind, NodeKind::Device(_))
				&& (n.pos.x - p.x).powi(2) + (n.pos.y - p.y).powi(2) <= r2
		});
		if device.is_some() {
			return device;
		}
		let in_box = |pred: fn(&NodeKind) -> bool| {
			self.nodes
				.iter()
				.rev()
				.filter(|n| pred(&n.node.kind))
				.find(|n| self.bounds_of(n).is_some_and(|b| b.contains(p)))
		};
		in_box(|k| matches!(k, NodeKind::DeviceWrapper { .. }))
			.or_else(|| in_box(|k| matches!(k, NodeKind::Network(_))))
			.or_else(|| in_box(|k| matches!(k, NodeKind::Internet)))
	}

	/// Apply a freshly built model without moving any existing node.
	///
	/// Attributes (label, color, opacity, badges, edge kind) are overwritten.
	/// Elements the model no longer contains are dropped; new ones are placed
	/// next to a node they connect to.
	pub fn patch(&mut self, model: &GraphModel) -> PatchStats {
		let mut stats = PatchStats::default();
		let old: HashMap<String, SceneNode> = self
			.nodes
			.drain(..)
			.map(|n| (n.node.id.clone(), n))
			.collect();

		let mut placed: Positions = Positions::new();
		let mut fresh: Vec<&GraphNode> = Vec::new();
		for node in &model.nodes {
			match old.get(&node.id) {
				Some(prev) => {
					placed.insert(node.id.clone(), prev.pos);
					if prev.node != *node {
						stats.updated_nodes += 1;
					}
				}
				None => fresh.push(node),
			}
		}
		stats.removed_nodes = old.len() - placed.len();

		// Devices first so that their wrappers can follow them.
		let mut ring = 0usize;
		for node in fresh.iter().filter(|n| !matches!(n.kind, NodeKind::DeviceWrapper { .. })) {
			let anchor = model
				.edges
				.iter()
				.filter_map(|e| {
					if e.source == node.id {
						Some(e.target.as_str())
					} else if e.target == node.id {
						Some(e.source.as_str())
					} else {
						None
					}
				})
				.find_map(|id| placed.get(id).copied())
				.or_else(|| placed.get(INTERNET_ID).copied())
				.unwrap_or_default();
			placed.insert(node.id.clone(), anchor.offset(0.8 + ring as f64 * 0.9, self.spacing));
			ring += 1;
		}
		for node in &fresh {
			if let NodeKind::DeviceWrapper { child } = &node.kind {
				let pos = placed.get(child).copied().unwrap_or_default();
				placed.insert(node.id.clone(), pos);
			}
		}
		stats.added_nodes = fresh.len();

		self.nodes = model
			.nodes
			.iter()
			.map(|node| SceneNode {
				node: node.clone(),
				pos: placed.get(&node.id).copied().unwrap_or_default(),
			})
			.collect();
		self.reindex();

		let previous: HashMap<&str, &GraphEdge> =
			self.edges.iter().map(|e| (e.id.as_str(), e)).collect();
		let current: HashSet<&str> = model.edges.iter().map(|e| e.id.as_str()).collect();
		for edge in &model.edges {
			match previous.get(edge.id.as_str()) {
				Some(prev) if *prev != edge => stats.updated_edges += 1,
				Some(_) => {}
				None => stats.added_edges += 1,
			}
		}
		stats.removed_edges = previous.keys().filter(|id| !current.contains(*id)).count();
		self.edges = model.edges.clone();

		stats
	}
}

fn label_lines(label: &str) -> usize {
	if label.is_empty() { 0 } else { label.lines().count() }
}
