//! Visual theming for the topology canvas.
//!
//! Node fill colors come from the model (type or overlay color). The theme
//! only supplies chrome: background, box outlines, text and edge strokes.

use crate::model::EdgeKind;
use crate::style::Color;

/// How an edge is stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinePattern {
	Solid,
	Dashed,
	Dotted,
}

/// Stroke style for one [`EdgeKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: Color,
	/// Multiplier on the scaled base line width.
	pub width: f64,
	pub pattern: LinePattern,
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Secondary color for the radial gradient.
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Chrome for box-shaped nodes (internet and networks).
#[derive(Clone, Debug)]
pub struct BoxStyle {
	pub fill: Color,
	pub border: Color,
	pub border_width: f64,
	pub corner_radius: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeStyles {
	pub internet_link: EdgeStyle,
	pub membership: EdgeStyle,
	pub membership_offline: EdgeStyle,
	pub gateway_route: EdgeStyle,
	pub bluetooth_active: EdgeStyle,
	pub bluetooth_inactive: EdgeStyle,
}

impl EdgeStyles {
	pub fn get(&self, kind: EdgeKind) -> &EdgeStyle {
		match kind {
			EdgeKind::InternetLink => &self.internet_link,
			EdgeKind::Membership => &self.membership,
			EdgeKind::MembershipOffline => &self.membership_offline,
			EdgeKind::GatewayRoute => &self.gateway_route,
			EdgeKind::BluetoothActive => &self.bluetooth_active,
			EdgeKind::BluetoothInactive => &self.bluetooth_inactive,
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub internet: BoxStyle,
	pub network: BoxStyle,
	pub device_border: Color,
	pub text: Color,
	/// Text of wrapper category labels.
	pub category_text: Color,
	pub my_device_ring: Color,
	pub edges: EdgeStyles,
}

impl Default for Theme {
	fn default() -> Self {
		let slate = Color::rgb(100, 116, 139);
		Self {
			background: BackgroundStyle {
				color: Color::rgb(15, 23, 42),
				color_secondary: Color::rgb(30, 41, 59),
				use_gradient: true,
			},
			internet: BoxStyle {
				fill: Color::rgb(30, 41, 59),
				border: Color::rgb(224, 156, 40),
				border_width: 2.0,
				corner_radius: 12.0,
			},
			network: BoxStyle {
				fill: Color::rgba(51, 65, 85, 0.85),
				border: slate,
				border_width: 1.5,
				corner_radius: 8.0,
			},
			device_border: Color::rgba(255, 255, 255, 0.6),
			text: Color::rgb(226, 232, 240),
			category_text: Color::rgb(148, 163, 184),
			my_device_ring: Color::rgb(250, 204, 21),
			edges: EdgeStyles {
				internet_link: EdgeStyle {
					color: Color::rgb(224, 156, 40),
					width: 1.6,
					pattern: LinePattern::Dashed,
				},
				membership: EdgeStyle {
					color: slate.lighten(0.2),
					width: 1.0,
					pattern: LinePattern::Solid,
				},
				membership_offline: EdgeStyle {
					color: slate.with_alpha(0.5),
					width: 1.0,
					pattern: LinePattern::Dotted,
				},
				gateway_route: EdgeStyle {
					color: Color::rgb(224, 156, 40),
					width: 2.2,
					pattern: LinePattern::Solid,
				},
				bluetooth_active: EdgeStyle {
					color: Color::rgb(14, 165, 233),
					width: 1.4,
					pattern: LinePattern::Dashed,
				},
				bluetooth_inactive: EdgeStyle {
					color: Color::rgb(14, 165, 233).with_alpha(0.35),
					width: 1.0,
					pattern: LinePattern::Dotted,
				},
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_edge_kind_has_a_distinct_look() {
		let theme = Theme::default();
		let kinds = [
			EdgeKind::InternetLink,
			EdgeKind::Membership,
			EdgeKind::MembershipOffline,
			EdgeKind::GatewayRoute,
			EdgeKind::BluetoothActive,
			EdgeKind::BluetoothInactive,
		];
		for (i, a) in kinds.iter().enumerate() {
			for b in &kinds[i + 1..] {
				assert_ne!(theme.edges.get(*a), theme.edges.get(*b), "{a:?} vs {b:?}");
			}
		}
	}
}
