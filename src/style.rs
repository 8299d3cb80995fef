//! Colors, glyphs and the domain palette shared by the model builder and the
//! canvas renderer.

use crate::topology::{DeviceType, Severity};

/// Opacity of device wrappers that an active filter does not surface.
pub const DIMMED_OPACITY: f64 = 0.15;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Coverage status colors.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageColors {
	pub full: Color,
	pub partial: Color,
	pub missing: Color,
}

/// Colors the model builder bakes into nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub workstation: Color,
	pub server: Color,
	pub router: Color,
	pub switch: Color,
	pub firewall: Color,
	pub bluetooth: Color,
	pub other: Color,
	pub coverage: CoverageColors,
	pub critical: Color,
	pub high: Color,
	pub medium: Color,
	pub low: Color,
}

impl Palette {
	/// Default color for a device category.
	pub fn device_type(&self, kind: DeviceType) -> Color {
		match kind {
			DeviceType::Workstation => self.workstation,
			DeviceType::Server => self.server,
			DeviceType::Router => self.router,
			DeviceType::Switch => self.switch,
			DeviceType::Firewall => self.firewall,
			DeviceType::BtAudio | DeviceType::BtInput | DeviceType::BtOther => self.bluetooth,
			DeviceType::Other => self.other,
		}
	}

	/// Color of a severity; `None` for severities that carry no color.
	pub fn severity(&self, severity: Severity) -> Option<Color> {
		match severity {
			Severity::Critical => Some(self.critical),
			Severity::High => Some(self.high),
			Severity::Medium => Some(self.medium),
			Severity::Low => Some(self.low),
			Severity::Unknown => None,
		}
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			workstation: Color::rgb(67, 97, 238),
			server: Color::rgb(45, 158, 107),
			router: Color::rgb(224, 156, 40),
			switch: Color::rgb(124, 58, 237),
			firewall: Color::rgb(220, 38, 38),
			bluetooth: Color::rgb(14, 165, 233),
			other: Color::rgb(100, 116, 139),
			coverage: CoverageColors {
				full: Color::rgb(34, 197, 94),
				partial: Color::rgb(245, 158, 11),
				missing: Color::rgb(239, 68, 68),
			},
			critical: Color::rgb(220, 38, 38),
			high: Color::rgb(234, 88, 12),
			medium: Color::rgb(202, 138, 4),
			low: Color::rgb(37, 99, 235),
		}
	}
}

/// Glyph drawn inside a device node.
pub fn device_glyph(kind: DeviceType) -> &'static str {
	match kind {
		DeviceType::Workstation => "💻",
		DeviceType::Server => "🖥️",
		DeviceType::Router => "🌐",
		DeviceType::Switch => "🔀",
		DeviceType::Firewall => "🔥",
		DeviceType::BtAudio => "🎧",
		DeviceType::BtInput => "🖱️",
		DeviceType::BtOther => "📶",
		DeviceType::Other => "📱",
	}
}

/// Glyph for a network, guessed from its name.
pub fn network_glyph(name: &str) -> &'static str {
	let name = name.to_lowercase();
	if name.contains("dmz") {
		"🛡️"
	} else if name.contains("mgmt") || name.contains("management") {
		"⚙️"
	} else if name.contains("bluetooth") {
		"📶"
	} else if name.contains("corp") || name.contains("lan") || name.contains("office") {
		"🏢"
	} else {
		"🔗"
	}
}

pub const INTERNET_GLYPH: &str = "🌐";
pub const MY_DEVICE_BADGE: &str = "📍 My device";

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}

	#[test]
	fn network_glyphs_follow_name() {
		assert_eq!(network_glyph("Public DMZ"), "🛡️");
		assert_eq!(network_glyph("Mgmt"), "⚙️");
		assert_eq!(network_glyph("Office LAN"), "🏢");
		assert_eq!(network_glyph("lab"), "🔗");
	}
}
