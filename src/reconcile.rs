//! Structural versus attribute reconciliation of the rendered graph.
//!
//! The controller remembers the identity of the last topology snapshot it laid
//! out. A different snapshot (compared by `Arc` pointer, never by content)
//! triggers a full rebuild and layout. The same snapshot with a different
//! [`RenderState`] only patches attributes of the existing scene.

use std::sync::Arc;

use log::{debug, info};

use crate::layout::{ForceLayout, LayoutEngine};
use crate::model::GraphBuilder;
use crate::render_state::RenderState;
use crate::scene::{NodeGeometry, PatchStats, Scene, ViewTransform};
use crate::topology::Topology;

/// What a call to [`GraphController::reconcile`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	/// New snapshot: the scene was rebuilt and laid out from scratch.
	Structural,
	/// Same snapshot: attributes were patched in place, positions untouched.
	Attribute(PatchStats),
}

/// Canvas size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

/// Owns the live scene and decides how each input change is applied.
pub struct GraphController<L: LayoutEngine = ForceLayout> {
	builder: GraphBuilder,
	layout: L,
	geometry: NodeGeometry,
	spacing: f64,
	padding: f64,
	viewport: Viewport,
	transform: ViewTransform,
	previous: Option<Arc<Topology>>,
	scene: Option<Scene>,
	layout_runs: usize,
}

impl GraphController<ForceLayout> {
	/// Controller with the force layout configured as given.
	pub fn with_force_layout(builder: GraphBuilder, layout: ForceLayout) -> Self {
		let spacing = layout.config().ideal_edge_length;
		let padding = layout.config().padding;
		Self::new(builder, layout, spacing, padding)
	}
}

impl Default for GraphController<ForceLayout> {
	fn default() -> Self {
		Self::with_force_layout(GraphBuilder::default(), ForceLayout::default())
	}
}

impl<L: LayoutEngine> GraphController<L> {
	pub fn new(builder: GraphBuilder, layout: L, spacing: f64, padding: f64) -> Self {
		Self {
			builder,
			layout,
			geometry: NodeGeometry::default(),
			spacing,
			padding,
			viewport: Viewport::default(),
			transform: ViewTransform::default(),
			previous: None,
			scene: None,
			layout_runs: 0,
		}
	}

	/// Bring the scene in line with `topology` and `state`.
	pub fn reconcile(&mut self, topology: &Arc<Topology>, state: &RenderState) -> Transition {
		let model = self.builder.build(topology, state);

		let same_snapshot = self
			.previous
			.as_ref()
			.is_some_and(|previous| Arc::ptr_eq(previous, topology));

		if let (true, Some(scene)) = (same_snapshot, self.scene.as_mut()) {
			let stats = scene.patch(&model);
			if stats.is_empty() {
				debug!("net-topology-graph: render state change had no visible effect");
				return Transition::Attribute(stats);
			}
			debug!(
				"net-topology-graph: patched {} nodes (+{} -{}), {} edges (+{} -{})",
				stats.updated_nodes,
				stats.added_nodes,
				stats.removed_nodes,
				stats.updated_edges,
				stats.added_edges,
				stats.removed_edges
			);
			return Transition::Attribute(stats);
		}

		let positions = self.layout.layout(&model);
		self.layout_runs += 1;
		info!(
			"net-topology-graph: rebuilt graph with {} nodes, {} edges",
			model.nodes.len(),
			model.edges.len()
		);
		self.scene = Some(Scene::new(model, &positions, self.geometry.clone(), self.spacing));
		self.previous = Some(Arc::clone(topology));
		self.fit();
		Transition::Structural
	}

	pub fn scene(&self) -> Option<&Scene> {
		self.scene.as_ref()
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn transform_mut(&mut self) -> &mut ViewTransform {
		&mut self.transform
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Number of full layout passes run so far.
	pub fn layout_runs(&self) -> usize {
		self.layout_runs
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport = Viewport { width, height };
	}

	/// Frame the whole scene in the viewport.
	pub fn fit(&mut self) {
		if let Some(bounds) = self.scene.as_ref().and_then(Scene::bounds) {
			self.transform = ViewTransform::fit(
				bounds,
				self.viewport.width,
				self.viewport.height,
				self.padding,
			);
		}
	}

	/// Drop the scene and the snapshot it was built from.
	///
	/// The next [`reconcile`](Self::reconcile) is structural.
	pub fn teardown(&mut self) {
		if self.scene.take().is_some() {
			debug!("net-topology-graph: scene torn down");
		}
		self.previous = None;
	}
}
