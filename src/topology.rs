//! Topology data as reported by the backend.
//!
//! A [`Topology`] is received wholesale on every refresh and never mutated; the
//! renderer holds it behind an `Arc` and uses pointer identity to tell a new
//! fetch from a re-render of the same data.

use std::cmp::Ordering;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Backend primary key for a device.
pub type DeviceId = i64;

/// IP addresses of Bluetooth peripherals are stored as `bt:<mac>` or `bt:<name>`.
pub const BLUETOOTH_PREFIX: &str = "bt:";

/// A network segment.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Network {
	pub id: i64,
	pub name: String,
	/// CIDR notation. The Bluetooth pseudo-network uses a non-CIDR marker here.
	#[serde(default)]
	pub subnet: Option<String>,
	#[serde(default)]
	pub gateway: Option<String>,
	#[serde(default)]
	pub vlan_id: Option<u16>,
	#[serde(default)]
	pub description: Option<String>,
}

/// Broad device category, used for glyph and default color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
	Workstation,
	Server,
	Router,
	Switch,
	Firewall,
	BtAudio,
	BtInput,
	BtOther,
	#[default]
	#[serde(other)]
	Other,
}

/// Reachability as last recorded by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
	Active,
	Inactive,
	#[default]
	#[serde(other)]
	Unknown,
}

/// Category of a security product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum SolutionType {
	#[serde(rename = "antivirus")]
	Antivirus,
	#[serde(rename = "EDR")]
	Edr,
	#[serde(rename = "DRM")]
	Drm,
	#[serde(rename = "firewall")]
	Firewall,
	#[serde(rename = "other", other)]
	Other,
}

impl SolutionType {
	/// Display name as used by the backend.
	pub fn as_str(self) -> &'static str {
		match self {
			SolutionType::Antivirus => "antivirus",
			SolutionType::Edr => "EDR",
			SolutionType::Drm => "DRM",
			SolutionType::Firewall => "firewall",
			SolutionType::Other => "other",
		}
	}
}

/// State of a product assignment on a device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
	#[default]
	Active,
	Inactive,
	Outdated,
	#[serde(other)]
	Unknown,
}

/// A security product assigned to a device.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AssignedSolution {
	#[serde(default)]
	pub name: String,
	#[serde(rename = "type")]
	pub kind: SolutionType,
	#[serde(default, deserialize_with = "null_as_default")]
	pub status: AssignmentStatus,
}

impl AssignedSolution {
	/// An assignment known only by product name.
	pub fn named(name: String) -> Self {
		Self {
			name,
			kind: SolutionType::Other,
			status: AssignmentStatus::Active,
		}
	}

	pub fn is_active(&self) -> bool {
		self.status == AssignmentStatus::Active
	}
}

/// Vulnerability severity, ordered by [`Severity::rank`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Low,
	Medium,
	High,
	Critical,
	#[default]
	#[serde(other)]
	Unknown,
}

impl Severity {
	/// Critical ranks highest, unknown lowest.
	pub fn rank(self) -> u8 {
		match self {
			Severity::Unknown => 0,
			Severity::Low => 1,
			Severity::Medium => 2,
			Severity::High => 3,
			Severity::Critical => 4,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Severity::Unknown => "unknown",
			Severity::Low => "low",
			Severity::Medium => "medium",
			Severity::High => "high",
			Severity::Critical => "critical",
		}
	}
}

impl Ord for Severity {
	fn cmp(&self, other: &Self) -> Ordering {
		self.rank().cmp(&other.rank())
	}
}

impl PartialOrd for Severity {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilityStatus {
	#[default]
	Open,
	Patched,
	Ignored,
	#[serde(other)]
	Unknown,
}

/// A known vulnerability recorded against a device.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Vulnerability {
	#[serde(default)]
	pub cve_id: Option<String>,
	#[serde(default)]
	pub title: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub severity: Severity,
	#[serde(default, deserialize_with = "null_as_default")]
	pub status: VulnerabilityStatus,
}

impl Vulnerability {
	pub fn is_open(&self) -> bool {
		self.status == VulnerabilityStatus::Open
	}
}

/// A registered host.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Device {
	pub id: DeviceId,
	pub hostname: String,
	#[serde(default)]
	pub ip_address: Option<String>,
	#[serde(default)]
	pub mac_address: Option<String>,
	#[serde(default)]
	pub vendor: Option<String>,
	#[serde(default)]
	pub os: Option<String>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub device_type: DeviceType,
	#[serde(default, deserialize_with = "null_as_default")]
	pub status: DeviceStatus,
	#[serde(default, deserialize_with = "solution_list")]
	pub solutions: Vec<AssignedSolution>,
	#[serde(default, deserialize_with = "lenient_list")]
	pub vulnerabilities: Vec<Vulnerability>,
}

impl Device {
	/// The IP address, if one is recorded and non-empty.
	pub fn ip(&self) -> Option<&str> {
		self.ip_address.as_deref().filter(|ip| !ip.is_empty())
	}

	/// Bluetooth peripherals carry a `bt:` sentinel instead of an IP.
	pub fn is_bluetooth(&self) -> bool {
		self.ip().is_some_and(|ip| ip.starts_with(BLUETOOTH_PREFIX))
	}

	pub fn is_active(&self) -> bool {
		self.status == DeviceStatus::Active
	}

	/// Open vulnerabilities only.
	pub fn open_vulnerabilities(&self) -> impl Iterator<Item = &Vulnerability> {
		self.vulnerabilities.iter().filter(|v| v.is_open())
	}

	/// Whether at least one active assignment of `kind` exists.
	pub fn has_active(&self, kind: SolutionType) -> bool {
		self.solutions.iter().any(|s| s.kind == kind && s.is_active())
	}
}

/// A topology node, tagged by its `type` field.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TopologyNode {
	Network {
		id: String,
		#[serde(default)]
		label: String,
		data: Network,
	},
	Device {
		id: String,
		#[serde(default)]
		label: String,
		#[serde(default)]
		parent: Option<String>,
		data: Device,
	},
}

impl TopologyNode {
	/// Graph identifier, e.g. `net-3` or `dev-12`.
	pub fn id(&self) -> &str {
		match self {
			TopologyNode::Network { id, .. } | TopologyNode::Device { id, .. } => id,
		}
	}
}

/// Membership of a device (source) in a network (target).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TopologyEdge {
	pub id: String,
	pub source: String,
	pub target: String,
}

/// Server-side hints accompanying the topology.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TopologyMeta {
	/// Device registered for the machine running the backend, if known.
	#[serde(default)]
	pub this_pc_device_id: Option<DeviceId>,
}

/// Networks, devices and membership edges as of one fetch.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Topology {
	pub nodes: Vec<TopologyNode>,
	#[serde(default)]
	pub edges: Vec<TopologyEdge>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub meta: TopologyMeta,
}

impl Topology {
	/// Network nodes with their graph ids, in backend order.
	pub fn networks(&self) -> impl Iterator<Item = (&str, &Network)> {
		self.nodes.iter().filter_map(|node| match node {
			TopologyNode::Network { id, data, .. } => Some((id.as_str(), data)),
			TopologyNode::Device { .. } => None,
		})
	}

	/// Device nodes with their graph ids, in backend order.
	pub fn devices(&self) -> impl Iterator<Item = (&str, &Device)> {
		self.nodes.iter().filter_map(|node| match node {
			TopologyNode::Device { id, data, .. } => Some((id.as_str(), data)),
			TopologyNode::Network { .. } => None,
		})
	}

	/// Look up a device by graph id.
	pub fn device(&self, node_id: &str) -> Option<&Device> {
		self.devices()
			.find(|(id, _)| *id == node_id)
			.map(|(_, device)| device)
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list entry that is kept when it parses and dropped otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
	Item(T),
	Skipped(IgnoredAny),
}

/// The topology endpoint lists solutions by name only; device detail sends
/// full assignments.
#[derive(Deserialize)]
#[serde(untagged)]
enum SolutionEntry {
	Assigned(AssignedSolution),
	Name(String),
	Skipped(IgnoredAny),
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let entries: Vec<Lenient<T>> = null_as_default(deserializer)?;
	Ok(entries
		.into_iter()
		.filter_map(|entry| match entry {
			Lenient::Item(item) => Some(item),
			Lenient::Skipped(_) => None,
		})
		.collect())
}

fn solution_list<'de, D>(deserializer: D) -> Result<Vec<AssignedSolution>, D::Error>
where
	D: Deserializer<'de>,
{
	let entries: Vec<SolutionEntry> = null_as_default(deserializer)?;
	Ok(entries
		.into_iter()
		.filter_map(|entry| match entry {
			SolutionEntry::Assigned(solution) => Some(solution),
			SolutionEntry::Name(name) => Some(AssignedSolution::named(name)),
			SolutionEntry::Skipped(_) => None,
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"nodes": [
			{"id": "net-1", "label": "Office", "type": "network",
			 "data": {"id": 1, "name": "Office LAN", "subnet": "192.168.1.0/24", "gateway": "192.168.1.1", "vlan_id": null, "description": null}},
			{"id": "dev-1", "label": "ws-01", "type": "device", "parent": "net-1",
			 "data": {"id": 1, "hostname": "ws-01", "ip_address": "192.168.1.20", "mac_address": null,
			          "os": "Windows 11", "device_type": "workstation", "status": "active",
			          "solutions": [{"name": "Defender", "type": "antivirus", "status": "active"},
			                        {"name": "Falcon", "type": "EDR", "status": null}],
			          "vulnerabilities": [{"cve_id": "CVE-2024-21412", "title": "SmartScreen bypass", "severity": "high", "status": "open"},
			                              {"title": "Old finding", "severity": "critical", "status": "patched"}]}},
			{"id": "dev-2", "label": "buds", "type": "device",
			 "data": {"id": 2, "hostname": "buds", "ip_address": "bt:AA:BB:CC:DD:EE:FF", "device_type": "bt_audio", "status": "inactive"}}
		],
		"edges": [{"id": "e-dev1-net1", "source": "dev-1", "target": "net-1"}],
		"meta": {"this_pc_device_id": 1}
	}"#;

	#[test]
	fn parses_backend_topology() {
		let topology: Topology = serde_json::from_str(SAMPLE).unwrap();
		assert_eq!(topology.networks().count(), 1);
		assert_eq!(topology.devices().count(), 2);
		assert_eq!(topology.meta.this_pc_device_id, Some(1));

		let ws = topology.device("dev-1").unwrap();
		assert_eq!(ws.device_type, DeviceType::Workstation);
		assert_eq!(ws.solutions[1].kind, SolutionType::Edr);
		assert!(ws.solutions[1].is_active());
		assert_eq!(ws.open_vulnerabilities().count(), 1);
		assert!(!ws.is_bluetooth());
	}

	#[test]
	fn missing_lists_and_unknown_enums_default() {
		let topology: Topology = serde_json::from_str(SAMPLE).unwrap();
		let buds = topology.device("dev-2").unwrap();
		assert!(buds.solutions.is_empty());
		assert!(buds.vulnerabilities.is_empty());
		assert!(buds.is_bluetooth());
		assert_eq!(buds.status, DeviceStatus::Inactive);

		let odd: Device = serde_json::from_str(
			r#"{"id": 9, "hostname": "x", "ip_address": "", "device_type": "toaster", "status": "weird", "solutions": null}"#,
		)
		.unwrap();
		assert_eq!(odd.device_type, DeviceType::Other);
		assert_eq!(odd.status, DeviceStatus::Unknown);
		assert_eq!(odd.ip(), None);
	}

	#[test]
	fn severities_rank_critical_first() {
		assert!(Severity::Critical > Severity::High);
		assert!(Severity::High > Severity::Medium);
		assert!(Severity::Medium > Severity::Low);
		assert!(Severity::Low > Severity::Unknown);
	}

	#[test]
	fn unrecognized_severity_decodes_to_unknown_and_ranks_lowest() {
		let v: Vulnerability =
			serde_json::from_str(r#"{"title": "x", "severity": "catastrophic"}"#).unwrap();
		assert_eq!(v.severity, Severity::Unknown);
		assert_eq!(
			[Severity::Low, v.severity, Severity::Medium].into_iter().max(),
			Some(Severity::Medium)
		);
		assert_eq!([v.severity, Severity::Low].into_iter().min(), Some(Severity::Unknown));
	}

	#[test]
	fn name_only_solutions_are_accepted() {
		let device: Device = serde_json::from_str(
			r#"{"id": 3, "hostname": "ws", "solutions": ["Defender", {"name": "Falcon", "type": "EDR"}, 42]}"#,
		)
		.unwrap();
		assert_eq!(device.solutions.len(), 2);
		assert_eq!(device.solutions[0].name, "Defender");
		assert_eq!(device.solutions[0].kind, SolutionType::Other);
		assert_eq!(device.solutions[1].kind, SolutionType::Edr);
	}

	#[test]
	fn incomplete_vulnerabilities_do_not_reject_the_snapshot() {
		let device: Device = serde_json::from_str(
			r#"{"id": 4, "hostname": "db", "vulnerabilities": [
				{"title": "no severity", "status": "open"},
				{"title": "null severity", "severity": null},
				"garbage"
			]}"#,
		)
		.unwrap();
		assert_eq!(device.vulnerabilities.len(), 2);
		assert!(device.vulnerabilities.iter().all(|v| v.severity == Severity::Unknown));
		assert_eq!(device.open_vulnerabilities().count(), 2);
	}
}
