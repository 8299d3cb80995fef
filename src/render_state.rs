//! Client-side state layered over a topology: which device is mine, which
//! addresses are gateways, which subnets are reachable, and the active overlay.

use std::collections::{BTreeMap, BTreeSet};

use crate::client::{InterfaceInfo, Whoami};
use crate::topology::{DeviceId, Severity, SolutionType, Topology};

/// Gateway IP to human-readable role, e.g. `"Wi-Fi default gateway"`.
pub type GatewayRoles = BTreeMap<String, String>;

/// Which color overlay is applied to devices. At most one is ever active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayMode {
	#[default]
	Off,
	/// Color by required security-solution coverage.
	Coverage,
	/// Color by highest open vulnerability severity.
	Vulnerability,
}

/// Everything besides the topology that affects how the graph looks.
///
/// Filters are kept per mode so switching modes back and forth preserves them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderState {
	pub my_device: Option<DeviceId>,
	pub gateway_roles: GatewayRoles,
	pub active_cidrs: BTreeSet<String>,
	pub overlay: OverlayMode,
	/// Solution types whose absence should be surfaced in coverage mode.
	pub coverage_filter: BTreeSet<SolutionType>,
	/// Severities to surface in vulnerability mode.
	pub severity_filter: BTreeSet<Severity>,
}

impl RenderState {
	pub fn with_interfaces(mut self, interfaces: InterfaceState) -> Self {
		self.gateway_roles = interfaces.gateway_roles;
		self.active_cidrs = interfaces.active_cidrs;
		self
	}

	/// Take an automatically detected device as mine.
	///
	/// A failed detection never clears the current choice, so a device picked
	/// by hand survives polls that cannot identify this machine. Returns
	/// whether the choice changed.
	pub fn adopt_detected(&mut self, detected: Option<DeviceId>) -> bool {
		match detected {
			Some(id) if self.my_device != Some(id) => {
				self.my_device = Some(id);
				true
			}
			_ => false,
		}
	}

	/// Toggle coverage mode; turning it on turns vulnerability mode off.
	pub fn toggle_coverage(&mut self) {
		self.overlay = match self.overlay {
			OverlayMode::Coverage => OverlayMode::Off,
			_ => OverlayMode::Coverage,
		};
	}

	/// Toggle vulnerability mode; turning it on turns coverage mode off.
	pub fn toggle_vulnerability(&mut self) {
		self.overlay = match self.overlay {
			OverlayMode::Vulnerability => OverlayMode::Off,
			_ => OverlayMode::Vulnerability,
		};
	}

	pub fn toggle_coverage_filter(&mut self, kind: SolutionType) {
		if !self.coverage_filter.remove(&kind) {
			self.coverage_filter.insert(kind);
		}
	}

	pub fn toggle_severity_filter(&mut self, severity: Severity) {
		if !self.severity_filter.remove(&severity) {
			self.severity_filter.insert(severity);
		}
	}
}

/// Gateway roles and reachable subnets derived from local interfaces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterfaceState {
	pub gateway_roles: GatewayRoles,
	pub active_cidrs: BTreeSet<String>,
}

impl InterfaceState {
	pub fn from_interfaces(interfaces: &[InterfaceInfo]) -> Self {
		let mut state = Self::default();
		for iface in interfaces {
			if let Some(gateway) = non_empty(&iface.gateway) {
				let role = match non_empty(&iface.adapter) {
					Some(adapter) => format!("{adapter} default gateway"),
					None => "default gateway".to_string(),
				};
				state.gateway_roles.insert(gateway.to_string(), role);
			}
			if let Some(cidr) = non_empty(&iface.cidr) {
				state.active_cidrs.insert(cidr.to_string());
			}
		}
		state
	}
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Work out which registered device is the viewing machine.
///
/// A server-side hint wins. Otherwise the client IP and every local interface
/// IP are tried, then local MACs (case-insensitive).
pub fn detect_my_device(topology: &Topology, whoami: Option<&Whoami>) -> Option<DeviceId> {
	if let Some(id) = topology.meta.this_pc_device_id {
		return Some(id);
	}
	let whoami = whoami?;

	let candidates: BTreeSet<&str> = whoami
		.ip
		.as_deref()
		.into_iter()
		.chain(whoami.local_ips.iter().map(String::as_str))
		.collect();
	let by_ip = topology
		.devices()
		.find(|(_, device)| device.ip().is_some_and(|ip| candidates.contains(ip)));
	if let Some((_, device)) = by_ip {
		return Some(device.id);
	}

	let local_macs: BTreeSet<String> = whoami
		.local_macs
		.values()
		.map(|mac| mac.to_uppercase())
		.collect();
	topology
		.devices()
		.find(|(_, device)| {
			device
				.mac_address
				.as_deref()
				.is_some_and(|mac| local_macs.contains(&mac.to_uppercase()))
		})
		.map(|(_, device)| device.id)
}
