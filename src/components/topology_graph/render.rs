//! Canvas rendering for the topology scene.
//!
//! Drawing happens in passes for z-ordering:
//! 1. Background (screen space)
//! 2. Edges (graph space)
//! 3. Internet and network boxes
//! 4. Devices, with the "my device" ring
//! 5. Wrapper category labels above their device

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::theme::{BoxStyle, LinePattern, Theme};
use crate::layout::Point;
use crate::model::NodeKind;
use crate::reconcile::GraphController;
use crate::scene::{Scene, SceneNode};

/// Renders the controller's scene to the canvas.
pub fn render(controller: &GraphController, ctx: &CanvasRenderingContext2d, config: &ScaleConfig, theme: &Theme) {
	let viewport = controller.viewport();
	draw_background(ctx, theme, viewport.width, viewport.height);

	let Some(scene) = controller.scene() else {
		return;
	};
	let transform = controller.transform();
	let scale = ScaledValues::new(config, transform.k);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	draw_edges(scene, ctx, &scale, theme);
	for node in scene.nodes() {
		match &node.node.kind {
			NodeKind::Internet => draw_box(scene, node, ctx, &scale, theme, &theme.internet, scene.geometry().internet_size),
			NodeKind::Network(_) => draw_box(scene, node, ctx, &scale, theme, &theme.network, scene.geometry().network_size),
			NodeKind::Device(_) | NodeKind::DeviceWrapper { .. } => {}
		}
	}
	for node in scene.nodes().iter().filter(|n| matches!(n.node.kind, NodeKind::Device(_))) {
		draw_device(scene, node, ctx, &scale, theme);
	}
	for node in scene.nodes() {
		if let NodeKind::DeviceWrapper { .. } = node.node.kind {
			draw_category(scene, node, ctx, &scale, theme);
		}
	}

	ctx.set_global_alpha(1.0);
	ctx.restore();
}

fn draw_background(ctx: &CanvasRenderingContext2d, theme: &Theme, width: f64, height: f64) {
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				width / 2.0,
				height / 2.0,
				0.0,
				width / 2.0,
				height / 2.0,
				width.max(height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_edges(scene: &Scene, ctx: &CanvasRenderingContext2d, scale: &ScaledValues, theme: &Theme) {
	for edge in scene.edges() {
		let (Some(from), Some(to)) = (scene.position(&edge.source), scene.position(&edge.target)) else {
			continue;
		};
		let style = theme.edges.get(edge.kind);

		let pattern = match style.pattern {
			LinePattern::Solid => js_sys::Array::new(),
			LinePattern::Dashed => dash_array(scale.dash_pattern),
			LinePattern::Dotted => dash_array(scale.dot_pattern),
		};
		let _ = ctx.set_line_dash(&pattern);

		ctx.set_global_alpha(1.0);
		ctx.set_stroke_style_str(&style.color.to_css());
		ctx.set_line_width(scale.edge_line_width * style.width);
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn dash_array((on, off): (f64, f64)) -> js_sys::Array {
	js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off))
}

fn draw_box(
	scene: &Scene,
	node: &SceneNode,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	style: &BoxStyle,
	(width, height): (f64, f64),
) {
	let Point { x, y } = node.pos;
	ctx.set_global_alpha(scene.opacity(&node.node));

	rounded_rect(ctx, x - width / 2.0, y - height / 2.0, width, height, style.corner_radius);
	ctx.set_fill_style_str(&style.fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&style.border.to_css());
	ctx.set_line_width(style.border_width / scale.k.max(1.0));
	ctx.stroke();

	ctx.set_fill_style_str(&theme.text.to_css());
	ctx.set_font(&scale.label_font);
	draw_lines(ctx, &node.node.label, x, y, scale.label_line_height);
}

fn draw_device(
	scene: &Scene,
	node: &SceneNode,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let Point { x, y } = node.pos;
	let radius = scene.geometry().device_radius;
	ctx.set_global_alpha(scene.opacity(&node.node));

	if node.node.is_my_device {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.my_device_ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	let base = node.node.color;
	let gradient = ctx
		.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
		.ok();
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.fill();
	ctx.set_stroke_style_str(&theme.device_border.to_css());
	ctx.set_line_width(1.0 / scale.k.max(1.0));
	ctx.stroke();

	let mut lines = node.node.label.lines();
	if let Some(glyph) = lines.next() {
		ctx.set_font(&scale.glyph_font);
		let _ = ctx.fill_text(glyph, x, y);
	}

	let caption: Vec<&str> = lines.collect();
	if caption.is_empty() || scale.label_alpha <= 0.0 {
		return;
	}
	let step = scale.label_line_height;
	ctx.set_global_alpha(scene.opacity(&node.node) * scale.label_alpha);
	ctx.set_fill_style_str(&theme.text.to_css());
	ctx.set_font(&scale.label_font);
	for (i, line) in caption.iter().enumerate() {
		let _ = ctx.fill_text(line, x, y + radius + step * (i as f64 + 0.8));
	}
}

/// Category label stacked above the wrapped device.
fn draw_category(
	scene: &Scene,
	node: &SceneNode,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	if node.node.label.is_empty() {
		return;
	}
	let Point { x, y } = node.pos;
	let step = scale.label_line_height;
	let bottom = y - scene.geometry().device_radius - scale.ring_offset - step * 0.6;
	let lines: Vec<&str> = node.node.label.lines().collect();

	ctx.set_global_alpha(node.node.opacity);
	ctx.set_fill_style_str(&if node.node.is_my_device {
		theme.my_device_ring.to_css()
	} else {
		theme.category_text.to_css()
	});
	ctx.set_font(&scale.label_font);
	for (i, line) in lines.iter().rev().enumerate() {
		let _ = ctx.fill_text(line, x, bottom - step * i as f64);
	}
}

/// Multi-line text centred on `(x, y)`.
fn draw_lines(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, step: f64) {
	let lines: Vec<&str> = text.lines().collect();
	let top = y - step * (lines.len() as f64 - 1.0) / 2.0;
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x, top + step * i as f64);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}
