//! On-screen key for node glyphs and edge strokes.

use leptos::prelude::*;

use super::theme::{LinePattern, Theme};
use crate::model::EdgeKind;
use crate::style::{INTERNET_GLYPH, device_glyph, network_glyph};
use crate::topology::DeviceType;

const EDGE_KINDS: [EdgeKind; 6] = [
	EdgeKind::InternetLink,
	EdgeKind::Membership,
	EdgeKind::MembershipOffline,
	EdgeKind::GatewayRoute,
	EdgeKind::BluetoothActive,
	EdgeKind::BluetoothInactive,
];

fn edge_label(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::InternetLink => "Internet link (public segment)",
		EdgeKind::Membership => "Network membership",
		EdgeKind::MembershipOffline => "Membership, not reachable here",
		EdgeKind::GatewayRoute => "Gateway route",
		EdgeKind::BluetoothActive => "Bluetooth, connected",
		EdgeKind::BluetoothInactive => "Bluetooth, disconnected",
	}
}

fn border_style(pattern: LinePattern) -> &'static str {
	match pattern {
		LinePattern::Solid => "solid",
		LinePattern::Dashed => "dashed",
		LinePattern::Dotted => "dotted",
	}
}

/// A legend row for one edge kind.
#[derive(Clone, Debug, PartialEq)]
struct EdgeKey {
	label: &'static str,
	/// CSS drawing a short sample of the stroke.
	css: String,
}

fn edge_keys(theme: &Theme) -> Vec<EdgeKey> {
	EDGE_KINDS
		.iter()
		.map(|&kind| {
			let style = theme.edges.get(kind);
			EdgeKey {
				label: edge_label(kind),
				css: format!(
					"border-top: {:.1}px {} {}",
					(style.width * 2.0).max(1.0),
					border_style(style.pattern),
					style.color.to_css()
				),
			}
		})
		.collect()
}

fn node_keys() -> [(&'static str, &'static str); 8] {
	[
		(INTERNET_GLYPH, "Internet"),
		(network_glyph("lan"), "Internal network"),
		(network_glyph("dmz"), "DMZ (public segment)"),
		(network_glyph("mgmt"), "Management network"),
		(device_glyph(DeviceType::Workstation), "PC / workstation"),
		(device_glyph(DeviceType::Server), "Server"),
		(device_glyph(DeviceType::Router), "Router / gateway"),
		(device_glyph(DeviceType::Firewall), "Firewall"),
	]
}

/// Static key drawn over the bottom-left corner of the canvas.
#[component]
pub fn Legend(#[prop(optional)] theme: Theme) -> impl IntoView {
	let nodes = node_keys()
		.into_iter()
		.map(|(glyph, label)| {
			view! {
				<div class="legend-row">
					<span class="legend-glyph">{glyph}</span>
					<span>{label}</span>
				</div>
			}
		})
		.collect_view();
	let edges = edge_keys(&theme)
		.into_iter()
		.map(|key| {
			view! {
				<div class="legend-row">
					<span class="legend-line" style=format!("display: inline-block; width: 24px; {}", key.css)></span>
					<span>{key.label}</span>
				</div>
			}
		})
		.collect_view();

	view! {
		<div class="graph-legend" style="position: absolute; left: 16px; bottom: 16px; pointer-events: none;">
			<div class="legend-title">"Legend"</div>
			{nodes}
			{edges}
		</div>
	}
}
