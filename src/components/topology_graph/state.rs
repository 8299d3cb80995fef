//! Canvas interaction state.
//!
//! Owns the [`GraphController`] together with the pointer state the canvas
//! needs: a press either turns into a background pan once it moves past a
//! small threshold, or is released in place and becomes a tap.

use crate::dispatch::{self, SelectionEvent};
use crate::reconcile::GraphController;

/// Pointer travel (screen pixels) below which a press still counts as a tap.
pub const TAP_TOLERANCE: f64 = 4.0;

/// Zoom factor of one click on the zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 1.3;

/// Tracks an in-progress press and the pan it may turn into.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything the canvas event handlers and the render loop share.
pub struct CanvasState {
	pub controller: GraphController,
	pub pan: PanState,
	pressed: bool,
	/// Run once on unmount, newest first.
	shutdown_hooks: Vec<Box<dyn FnOnce()>>,
}

impl CanvasState {
	pub fn new(controller: GraphController) -> Self {
		Self {
			controller,
			pan: PanState::default(),
			pressed: false,
			shutdown_hooks: Vec::new(),
		}
	}

	/// Register cleanup for something attached outside the canvas, such as a
	/// window listener.
	pub fn on_shutdown(&mut self, hook: impl FnOnce() + 'static) {
		self.shutdown_hooks.push(Box::new(hook));
	}

	/// Run the registered hooks and drop the scene.
	pub fn shutdown(&mut self) {
		for hook in self.shutdown_hooks.drain(..).rev() {
			hook();
		}
		self.cancel();
		self.controller.teardown();
	}

	pub fn press(&mut self, x: f64, y: f64) {
		let transform = self.controller.transform();
		self.pressed = true;
		self.pan = PanState {
			active: false,
			start_x: x,
			start_y: y,
			transform_start_x: transform.x,
			transform_start_y: transform.y,
		};
	}

	/// Pointer moved to `(x, y)`; pans once the press left the tap tolerance.
	pub fn drag(&mut self, x: f64, y: f64) {
		if !self.pressed {
			return;
		}
		let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
		if !self.pan.active && dx.hypot(dy) > TAP_TOLERANCE {
			self.pan.active = true;
		}
		if self.pan.active {
			let transform = self.controller.transform_mut();
			transform.x = self.pan.transform_start_x + dx;
			transform.y = self.pan.transform_start_y + dy;
		}
	}

	/// End the press. Returns the selection event when it was a tap.
	pub fn release(&mut self, x: f64, y: f64) -> Option<SelectionEvent> {
		let was_tap = self.pressed && !self.pan.active;
		self.cancel();
		if !was_tap {
			return None;
		}
		let point = self.controller.transform().screen_to_graph(x, y);
		let scene = self.controller.scene()?;
		Some(dispatch::tap(scene, point))
	}

	/// Abandon any press, e.g. when the pointer leaves the canvas.
	pub fn cancel(&mut self) {
		self.pressed = false;
		self.pan.active = false;
	}

	/// Zoom around the centre of the viewport.
	pub fn zoom_centered(&mut self, factor: f64) {
		let viewport = self.controller.viewport();
		self.controller
			.transform_mut()
			.zoom_at(viewport.width / 2.0, viewport.height / 2.0, factor);
	}

	/// Wheel zoom around the pointer.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.controller.transform_mut().zoom_at(x, y, factor);
	}
}
