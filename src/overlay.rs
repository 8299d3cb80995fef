//! Coverage and vulnerability overlays.
//!
//! Each overlay yields a color for the device node and a highlight/dim flag for
//! its wrapper. Neither touches graph structure, so both can be re-evaluated on
//! every render without a re-layout.

use std::collections::BTreeSet;

use crate::render_state::{OverlayMode, RenderState};
use crate::style::{Color, DIMMED_OPACITY, Palette};
use crate::topology::{Device, Severity, SolutionType};

/// Solution types a device must actively run to count as fully covered.
pub const REQUIRED_SOLUTIONS: [SolutionType; 3] = [
	SolutionType::Antivirus,
	SolutionType::Edr,
	SolutionType::Firewall,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageStatus {
	/// Every required type has an active assignment.
	Full,
	/// Some assignments exist, but at least one required type is not active.
	Partial,
	/// Nothing is assigned at all.
	Missing,
}

/// Evaluated look of one device under the current overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
	pub color: Color,
	/// Applied to the device's wrapper (and through it, to the device).
	pub opacity: f64,
}

pub fn coverage_status(device: &Device) -> CoverageStatus {
	if device.solutions.is_empty() {
		CoverageStatus::Missing
	} else if REQUIRED_SOLUTIONS.iter().all(|&kind| device.has_active(kind)) {
		CoverageStatus::Full
	} else {
		CoverageStatus::Partial
	}
}

/// The highest-ranked severity among open vulnerabilities.
pub fn highest_open_severity(device: &Device) -> Option<Severity> {
	device.open_vulnerabilities().map(|v| v.severity).max()
}

/// True when at least one filtered type is not active on the device.
///
/// The coverage filter surfaces gaps, not matches.
pub fn has_coverage_gap(device: &Device, filter: &BTreeSet<SolutionType>) -> bool {
	filter.iter().any(|&kind| !device.has_active(kind))
}

/// True when at least one open vulnerability has a filtered severity.
pub fn has_filtered_severity(device: &Device, filter: &BTreeSet<Severity>) -> bool {
	device
		.open_vulnerabilities()
		.any(|v| filter.contains(&v.severity))
}

/// Color and wrapper opacity for a registered device.
pub fn device_appearance(device: &Device, state: &RenderState, palette: &Palette) -> Appearance {
	let default_color = palette.device_type(device.device_type);
	match state.overlay {
		OverlayMode::Off => Appearance {
			color: default_color,
			opacity: 1.0,
		},
		OverlayMode::Coverage => {
			let color = match coverage_status(device) {
				CoverageStatus::Full => palette.coverage.full,
				CoverageStatus::Partial => palette.coverage.partial,
				CoverageStatus::Missing => palette.coverage.missing,
			};
			let highlighted =
				state.coverage_filter.is_empty() || has_coverage_gap(device, &state.coverage_filter);
			Appearance {
				color,
				opacity: opacity(highlighted),
			}
		}
		OverlayMode::Vulnerability => {
			let color = highest_open_severity(device)
				.and_then(|severity| palette.severity(severity))
				.unwrap_or(default_color);
			let highlighted = state.severity_filter.is_empty()
				|| has_filtered_severity(device, &state.severity_filter);
			Appearance {
				color,
				opacity: opacity(highlighted),
			}
		}
	}
}

fn opacity(highlighted: bool) -> f64 {
	if highlighted { 1.0 } else { DIMMED_OPACITY }
}
