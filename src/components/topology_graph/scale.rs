//! Zoom-dependent sizing for strokes and text.
//!
//! Node footprints live in graph space (see [`NodeGeometry`](crate::scene::NodeGeometry))
//! and scale with the view like everything else. Strokes and labels follow
//! the rules here so the diagram stays legible when zoomed far in or out.
//!
//! # Scaling Behaviors
//!
//! - [`ScaleBehavior::World`]: scales with zoom.
//! - [`ScaleBehavior::Screen`]: constant pixel size; divides by `k`.
//! - [`ScaleBehavior::Clamped`]: world-space, bounded in screen pixels.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	World,
	Screen,
	/// `(min_screen, max_screen)` in pixels; use infinities for unbounded.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha scales with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum AlphaBehavior {
	Constant,
	/// Fully visible at `full_alpha_k`, invisible at `zero_alpha_k`.
	Fade { zero_alpha_k: f64, full_alpha_k: f64 },
}

impl AlphaBehavior {
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

#[derive(Clone, Debug)]
pub struct LabelScaleConfig {
	/// Font size in world units.
	pub size: f64,
	pub size_behavior: ScaleBehavior,
	/// Glyph font size in world units.
	pub glyph_size: f64,
	/// Labels other than network names fade out when zoomed far out.
	pub alpha_behavior: AlphaBehavior,
}

#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in world units.
	pub line_width: f64,
	pub width_behavior: ScaleBehavior,
	/// Dash pattern (dash, gap) in world units.
	pub dash_pattern: (f64, f64),
	/// Dotted pattern (dot, gap) in world units.
	pub dot_pattern: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Width of the "my device" ring in screen pixels.
	pub width: f64,
	/// Gap between device outline and ring in world units.
	pub offset: f64,
}

/// Scale configuration for every drawn element.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub label: LabelScaleConfig,
	pub edge: EdgeScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label: LabelScaleConfig {
				size: 11.0,
				size_behavior: ScaleBehavior::Clamped {
					min_screen: 7.0,
					max_screen: 22.0,
				},
				glyph_size: 18.0,
				alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.25,
					full_alpha_k: 0.5,
				},
			},
			edge: EdgeScaleConfig {
				line_width: 1.5,
				width_behavior: ScaleBehavior::Clamped {
					min_screen: 0.75,
					max_screen: 4.0,
				},
				dash_pattern: (8.0, 5.0),
				dot_pattern: (2.0, 4.0),
			},
			ring: RingScaleConfig {
				width: 3.0,
				offset: 5.0,
			},
		}
	}
}

/// Scale values resolved for one zoom level. Build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub label_font: String,
	/// Line height matching `label_font`.
	pub label_line_height: f64,
	pub glyph_font: String,
	pub label_alpha: f64,
	pub edge_line_width: f64,
	pub dash_pattern: (f64, f64),
	pub dot_pattern: (f64, f64),
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_size = config.label.size_behavior.apply(config.label.size, k);
		Self {
			k,
			label_font: format!("{label_size}px sans-serif"),
			label_line_height: label_size * 1.2,
			glyph_font: format!("{}px sans-serif", config.label.glyph_size),
			label_alpha: config.label.alpha_behavior.apply(k),
			edge_line_width: config.edge.width_behavior.apply(config.edge.line_width, k),
			dash_pattern: config.edge.dash_pattern,
			dot_pattern: config.edge.dot_pattern,
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset,
		}
	}
}
