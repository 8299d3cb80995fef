//! Leptos component wrapping the topology canvas.
//!
//! The component owns one [`GraphController`] for its lifetime. Whenever the
//! topology or render state signal changes the controller reconciles; a
//! `requestAnimationFrame` loop only redraws. Mouse handlers pan, zoom and
//! turn taps into [`SelectionEvent`]s; overlay buttons zoom and refit.
//! Window listeners are detached when the component unmounts.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::legend::Legend;
use super::render;
use super::scale::ScaleConfig;
use super::state::{BUTTON_ZOOM_STEP, CanvasState};
use super::theme::Theme;
use crate::config::GraphConfig;
use crate::dispatch::SelectionEvent;
use crate::layout::ForceLayout;
use crate::model::GraphBuilder;
use crate::reconcile::GraphController;
use crate::render_state::RenderState;
use crate::style::Palette;
use crate::topology::Topology;

/// Bundles the interaction state with visual configuration.
struct GraphContext {
	state: CanvasState,
	scale: ScaleConfig,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas.
fn local_point(canvas: Option<HtmlCanvasElement>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = canvas?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn controller_for(config: &GraphConfig) -> GraphController {
	GraphController::with_force_layout(
		GraphBuilder::new(Palette::default(), config.public_segments.clone()),
		ForceLayout::new(config.layout.clone()),
	)
}

/// Renders the network topology on a canvas element.
///
/// Nothing is drawn until `topology` holds a snapshot. Replacing the snapshot
/// with a new `Arc` re-lays-out the graph; changing only `render_state`
/// restyles it in place. Taps are reported through `on_select`.
#[component]
pub fn TopologyGraphCanvas(
	#[prop(into)] topology: Signal<Option<Arc<Topology>>>,
	#[prop(into)] render_state: Signal<RenderState>,
	#[prop(into)] on_select: Callback<SelectionEvent>,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init) = (context.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
		let Some(ctx) = ctx else {
			warn!("net-topology-graph: 2d canvas context unavailable");
			return;
		};

		let mut state = CanvasState::new(controller_for(&config));
		state.controller.resize(w, h);
		if let Some(snapshot) = topology.get_untracked() {
			state.controller.reconcile(&snapshot, &render_state.get_untracked());
		}

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			let on_resize = Closure::<dyn FnMut()>::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.controller.resize(nw, nh);
				}
			});
			if window
				.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
				.is_ok()
			{
				// Owns the closure until the listener is gone.
				state.on_shutdown(move || {
					if let Some(window) = web_sys::window() {
						let _ = window
							.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
					}
				});
			}
		}

		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		});

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			match *context_anim.borrow() {
				Some(ref c) => render::render(&c.state.controller, &ctx, &c.scale, &c.theme),
				// torn down: stop scheduling frames
				None => return,
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_sync = context.clone();
	Effect::new(move |_| {
		let snapshot = topology.get();
		let state = render_state.get();
		let Some(snapshot) = snapshot else {
			return;
		};
		if let Some(ref mut c) = *context_sync.borrow_mut() {
			c.state.controller.reconcile(&snapshot, &state);
		}
	});

	let teardown = StoredValue::new_local(context.clone());
	on_cleanup(move || {
		teardown.try_with_value(|context| {
			let taken = context.borrow_mut().take();
			if let Some(mut c) = taken {
				c.state.shutdown();
				debug!("net-topology-graph: canvas unmounted");
			}
		});
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.press(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.drag(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		// Release the borrow before running the callback; it may update signals.
		let event = context_mu
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.state.release(x, y));
		if let Some(event) = event {
			on_select.run(event);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.cancel();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref.get().map(Into::into), &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.zoom(x, y, ev.delta_y());
		}
	};

	let zoom_button = |factor: f64| {
		let context = context.clone();
		move |_: MouseEvent| {
			if let Some(ref mut c) = *context.borrow_mut() {
				c.state.zoom_centered(factor);
			}
		}
	};
	let context_fit = context.clone();
	let on_fit = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_fit.borrow_mut() {
			c.state.controller.fit();
		}
	};

	view! {
		<div class="topology-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="topology-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="zoom-controls" style="position: absolute; top: 12px; right: 12px; display: flex; flex-direction: column; gap: 4px;">
				<button title="Zoom in" on:click=zoom_button(BUTTON_ZOOM_STEP)>"＋"</button>
				<button title="Zoom out" on:click=zoom_button(1.0 / BUTTON_ZOOM_STEP)>"－"</button>
				<button title="Fit to screen" on:click=on_fit>"⤢"</button>
			</div>
			<Legend />
		</div>
	}
}
