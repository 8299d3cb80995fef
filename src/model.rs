//! Graph model synthesis.
//!
//! [`GraphBuilder::build`] turns a [`Topology`] plus [`RenderState`] into a
//! [`GraphModel`]: typed nodes and edges with their style attributes already
//! resolved. The function is pure and deterministic, which lets the
//! reconciliation layer diff two models by element id.
//!
//! Beyond the backend data the model contains:
//! - one synthetic `internet` node,
//! - a virtual gateway device for every gateway role whose IP is not registered,
//! - an invisible wrapper around every device that carries its category label.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::cidr::{self, Cidr};
use crate::overlay;
use crate::render_state::RenderState;
use crate::style::{self, Color, INTERNET_GLYPH, MY_DEVICE_BADGE, Palette};
use crate::topology::{BLUETOOTH_PREFIX, Device, DeviceType, Network, Topology};

/// Id of the synthetic internet anchor.
pub const INTERNET_ID: &str = "internet";

/// The device behind a `device` node.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceSource {
	/// A device registered in the backend.
	Registered(Device),
	/// A gateway seen on a local interface with no registered device.
	VirtualGateway { ip: String, role: String },
}

/// Node category with its domain payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	Internet,
	Network(Network),
	/// Invisible compound that carries the category label above `child`.
	DeviceWrapper { child: String },
	Device(DeviceSource),
}

impl NodeKind {
	pub fn tag(&self) -> &'static str {
		match self {
			NodeKind::Internet => "internet",
			NodeKind::Network(_) => "network",
			NodeKind::DeviceWrapper { .. } => "device-wrapper",
			NodeKind::Device(_) => "device",
		}
	}
}

/// A node of the synthesized graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub kind: NodeKind,
	/// Display text. For wrappers this is the category label (may be empty).
	pub label: String,
	pub color: Color,
	/// Only wrappers are ever dimmed; children inherit it when drawn.
	pub opacity: f64,
	/// Compound parent, set on devices (their wrapper).
	pub parent: Option<String>,
	pub is_my_device: bool,
}

/// Visual and semantic edge classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
	/// Internet to a network that looks publicly exposed.
	InternetLink,
	Membership,
	/// Membership of a device outside every currently reachable subnet.
	MembershipOffline,
	/// Gateway device to internet.
	GatewayRoute,
	BluetoothActive,
	BluetoothInactive,
}

impl EdgeKind {
	pub fn tag(self) -> &'static str {
		match self {
			EdgeKind::InternetLink => "internet-link",
			EdgeKind::Membership => "membership",
			EdgeKind::MembershipOffline => "membership-offline",
			EdgeKind::GatewayRoute => "gateway-route",
			EdgeKind::BluetoothActive => "bluetooth-active",
			EdgeKind::BluetoothInactive => "bluetooth-inactive",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
}

/// Output of [`GraphBuilder::build`]. Disposable; rebuild it whenever inputs change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphModel {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
		self.edges.iter().find(|e| e.id == id)
	}

	pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
		self.edges.iter().filter(move |e| e.kind == kind)
	}
}

/// Decides which internet-to-network edges are drawn as public links.
///
/// Purely a display convenience: a name keyword or a reserved address range is
/// not a routing or security classification.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicSegmentHeuristic {
	/// Case-insensitive substrings of the network name.
	pub name_keywords: Vec<String>,
	/// CIDR blocks; a network whose address falls in one of them matches.
	pub reserved_ranges: Vec<String>,
}

impl Default for PublicSegmentHeuristic {
	fn default() -> Self {
		Self {
			name_keywords: vec!["dmz".to_string()],
			reserved_ranges: vec!["10.0.0.0/8".to_string()],
		}
	}
}

impl PublicSegmentHeuristic {
	pub fn is_public(&self, network: &Network) -> bool {
		let name = network.name.to_lowercase();
		if self
			.name_keywords
			.iter()
			.any(|keyword| name.contains(&keyword.to_lowercase()))
		{
			return true;
		}
		let Some(block) = network.subnet.as_deref().and_then(Cidr::parse) else {
			return false;
		};
		let address = block.network().to_string();
		cidr::contained_in_any(&address, self.reserved_ranges.iter().map(String::as_str))
	}
}

/// Builds graph models with a fixed palette and edge heuristic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphBuilder {
	pub palette: Palette,
	pub heuristic: PublicSegmentHeuristic,
}

/// Build with the default palette and heuristic.
pub fn build(topology: &Topology, state: &RenderState) -> GraphModel {
	GraphBuilder::default().build(topology, state)
}

pub fn wrapper_id(device_id: &str) -> String {
	format!("wrap-{device_id}")
}

fn virtual_gateway_id(ip: &str) -> String {
	format!("gw-{ip}")
}

impl GraphBuilder {
	pub fn new(palette: Palette, heuristic: PublicSegmentHeuristic) -> Self {
		Self { palette, heuristic }
	}

	/// Synthesize the full graph model.
	pub fn build(&self, topology: &Topology, state: &RenderState) -> GraphModel {
		let mut model = GraphModel::default();

		model.nodes.push(GraphNode {
			id: INTERNET_ID.to_string(),
			kind: NodeKind::Internet,
			label: format!("{INTERNET_GLYPH}\nInternet"),
			color: self.palette.router,
			opacity: 1.0,
			parent: None,
			is_my_device: false,
		});

		self.push_networks(&mut model, topology, state);
		self.push_virtual_gateways(&mut model, topology, state);
		let my_node = self.push_devices(&mut model, topology, state);
		self.push_memberships(&mut model, topology, state);
		self.push_gateway_routes(&mut model, topology, state);
		if let Some(my_node) = my_node {
			self.push_bluetooth_links(&mut model, topology, &my_node);
		}

		model
	}

	fn push_networks(&self, model: &mut GraphModel, topology: &Topology, state: &RenderState) {
		for (id, network) in topology.networks() {
			let subnet = network.subnet.as_deref().unwrap_or_default();
			model.nodes.push(GraphNode {
				id: id.to_string(),
				kind: NodeKind::Network(network.clone()),
				label: format!("{} {}\n{}", style::network_glyph(&network.name), network.name, subnet),
				color: self.palette.other,
				opacity: 1.0,
				parent: None,
				is_my_device: false,
			});

			// A local gateway inside this subnet carries the route instead.
			let routed_by_gateway = state
				.gateway_roles
				.keys()
				.any(|gateway| cidr::contains(gateway, subnet));
			if routed_by_gateway {
				continue;
			}

			let kind = if self.heuristic.is_public(network) {
				EdgeKind::InternetLink
			} else {
				EdgeKind::Membership
			};
			model.edges.push(GraphEdge {
				id: format!("e-internet-{id}"),
				source: INTERNET_ID.to_string(),
				target: id.to_string(),
				kind,
			});
		}
	}

	fn push_virtual_gateways(&self, model: &mut GraphModel, topology: &Topology, state: &RenderState) {
		let registered: HashSet<&str> = topology.devices().filter_map(|(_, d)| d.ip()).collect();

		for (ip, role) in &state.gateway_roles {
			if registered.contains(ip.as_str()) {
				continue;
			}
			let device_id = virtual_gateway_id(ip);
			let wrapper = wrapper_id(&device_id);

			model.nodes.push(GraphNode {
				id: wrapper.clone(),
				kind: NodeKind::DeviceWrapper {
					child: device_id.clone(),
				},
				label: role.clone(),
				color: self.palette.router,
				opacity: 1.0,
				parent: None,
				is_my_device: false,
			});
			model.nodes.push(GraphNode {
				id: device_id.clone(),
				kind: NodeKind::Device(DeviceSource::VirtualGateway {
					ip: ip.clone(),
					role: role.clone(),
				}),
				label: format!("{}\ngateway\n{ip}", style::device_glyph(DeviceType::Router)),
				color: self.palette.router,
				opacity: 1.0,
				parent: Some(wrapper),
				is_my_device: false,
			});

			model.edges.push(GraphEdge {
				id: format!("e-route-{device_id}"),
				source: device_id.clone(),
				target: INTERNET_ID.to_string(),
				kind: EdgeKind::GatewayRoute,
			});
			for (network_id, network) in topology.networks() {
				let inside = network
					.subnet
					.as_deref()
					.is_some_and(|subnet| cidr::contains(ip, subnet));
				if inside {
					model.edges.push(GraphEdge {
						id: format!("e-{device_id}-{network_id}"),
						source: device_id.clone(),
						target: network_id.to_string(),
						kind: EdgeKind::Membership,
					});
				}
			}
		}
	}

	/// Emits wrapper + device pairs; returns the node id of "my device", if present.
	fn push_devices(&self, model: &mut GraphModel, topology: &Topology, state: &RenderState) -> Option<String> {
		let mut my_node = None;

		for (id, device) in topology.devices() {
			let is_mine = state.my_device == Some(device.id);
			let role = device.ip().and_then(|ip| state.gateway_roles.get(ip));
			let category: Vec<&str> = is_mine
				.then_some(MY_DEVICE_BADGE)
				.into_iter()
				.chain(role.map(String::as_str))
				.collect();

			let look = overlay::device_appearance(device, state, &self.palette);
			let wrapper = wrapper_id(id);

			model.nodes.push(GraphNode {
				id: wrapper.clone(),
				kind: NodeKind::DeviceWrapper { child: id.to_string() },
				label: category.join("\n"),
				color: look.color,
				opacity: look.opacity,
				parent: None,
				is_my_device: is_mine,
			});
			model.nodes.push(GraphNode {
				id: id.to_string(),
				kind: NodeKind::Device(DeviceSource::Registered(device.clone())),
				label: device_label(device),
				color: look.color,
				opacity: 1.0,
				parent: Some(wrapper),
				is_my_device: is_mine,
			});

			if is_mine && my_node.is_none() {
				my_node = Some(id.to_string());
			}
		}

		my_node
	}

	fn push_memberships(&self, model: &mut GraphModel, topology: &Topology, state: &RenderState) {
		let known: HashSet<&str> = topology.nodes.iter().map(|n| n.id()).collect();

		for edge in &topology.edges {
			if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
				continue;
			}
			let offline = !state.active_cidrs.is_empty()
				&& topology
					.device(&edge.source)
					.and_then(Device::ip)
					.is_some_and(|ip| !reachable(ip, &state.active_cidrs));
			model.edges.push(GraphEdge {
				id: edge.id.clone(),
				source: edge.source.clone(),
				target: edge.target.clone(),
				kind: if offline {
					EdgeKind::MembershipOffline
				} else {
					EdgeKind::Membership
				},
			});
		}
	}

	fn push_gateway_routes(&self, model: &mut GraphModel, topology: &Topology, state: &RenderState) {
		for (id, device) in topology.devices() {
			let is_gateway = device.ip().is_some_and(|ip| state.gateway_roles.contains_key(ip));
			if is_gateway {
				model.edges.push(GraphEdge {
					id: format!("e-route-{id}"),
					source: id.to_string(),
					target: INTERNET_ID.to_string(),
					kind: EdgeKind::GatewayRoute,
				});
			}
		}
	}

	fn push_bluetooth_links(&self, model: &mut GraphModel, topology: &Topology, my_node: &str) {
		for (id, device) in topology.devices() {
			if id == my_node || !device.is_bluetooth() {
				continue;
			}
			model.edges.push(GraphEdge {
				id: format!("e-bt-{id}"),
				source: id.to_string(),
				target: my_node.to_string(),
				kind: if device.is_active() {
					EdgeKind::BluetoothActive
				} else {
					EdgeKind::BluetoothInactive
				},
			});
		}
	}
}

fn reachable(ip: &str, active: &BTreeSet<String>) -> bool {
	cidr::contained_in_any(ip, active.iter().map(String::as_str))
}

/// Glyph, hostname and address. Bluetooth peripherals show their MAC.
fn device_label(device: &Device) -> String {
	let glyph = style::device_glyph(device.device_type);
	let address = if device.is_bluetooth() {
		device
			.mac_address
			.as_deref()
			.or_else(|| device.ip().and_then(|ip| ip.strip_prefix(BLUETOOTH_PREFIX)))
	} else {
		device.ip()
	};
	match address {
		Some(address) => format!("{glyph}\n{}\n{address}", device.hostname),
		None => format!("{glyph}\n{}", device.hostname),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::render_state::OverlayMode;
	use crate::topology::{
		AssignedSolution, AssignmentStatus, DeviceId, DeviceStatus, Severity, SolutionType,
		TopologyEdge, TopologyMeta, TopologyNode, Vulnerability, VulnerabilityStatus,
	};

	fn network(id: i64, name: &str, subnet: &str) -> TopologyNode {
		TopologyNode::Network {
			id: format!("net-{id}"),
			label: name.to_string(),
			data: Network {
				id,
				name: name.to_string(),
				subnet: Some(subnet.to_string()),
				gateway: None,
				vlan_id: None,
				description: None,
			},
		}
	}

	fn device(id: DeviceId, ip: Option<&str>, kind: DeviceType) -> Device {
		Device {
			id,
			hostname: format!("host-{id}"),
			ip_address: ip.map(str::to_string),
			mac_address: None,
			vendor: None,
			os: None,
			device_type: kind,
			status: DeviceStatus::Active,
			solutions: Vec::new(),
			vulnerabilities: Vec::new(),
		}
	}

	fn node(device: Device) -> TopologyNode {
		TopologyNode::Device {
			id: format!("dev-{}", device.id),
			label: device.hostname.clone(),
			parent: None,
			data: device,
		}
	}

	fn member(device: DeviceId, network: i64) -> TopologyEdge {
		TopologyEdge {
			id: format!("e-dev{device}-net{network}"),
			source: format!("dev-{device}"),
			target: format!("net-{network}"),
		}
	}

	fn office() -> Topology {
		Topology {
			nodes: vec![
				network(1, "Office LAN", "192.168.1.0/24"),
				network(2, "Servers", "10.0.5.0/24"),
				network(3, "Public DMZ", "172.16.0.0/24"),
				node(device(1, Some("192.168.1.20"), DeviceType::Workstation)),
				node(device(2, Some("10.0.5.10"), DeviceType::Server)),
				node(device(3, None, DeviceType::Other)),
			],
			edges: vec![member(1, 1), member(2, 2), member(3, 1)],
			meta: TopologyMeta::default(),
		}
	}

	fn count(model: &GraphModel, tag: &str) -> usize {
		model.nodes.iter().filter(|n| n.kind.tag() == tag).count()
	}

	#[test]
	fn build_is_deterministic() {
		let state = RenderState {
			my_device: Some(1),
			gateway_roles: [("10.0.5.1".to_string(), "Ethernet default gateway".to_string())].into(),
			active_cidrs: ["192.168.1.0/24".to_string()].into(),
			overlay: OverlayMode::Coverage,
			..Default::default()
		};
		assert_eq!(build(&office(), &state), build(&office(), &state));
	}

	#[test]
	fn one_internet_node_and_one_wrapper_per_device() {
		let empty = build(&Topology::default(), &RenderState::default());
		assert_eq!(count(&empty, "internet"), 1);
		assert_eq!(empty.edges.len(), 0);

		let state = RenderState {
			gateway_roles: [("192.168.7.1".to_string(), "Wi-Fi default gateway".to_string())].into(),
			..Default::default()
		};
		let model = build(&office(), &state);
		assert_eq!(count(&model, "internet"), 1);
		assert_eq!(count(&model, "device"), 4);
		assert_eq!(count(&model, "device-wrapper"), 4);
		for device in model.nodes.iter().filter(|n| n.kind.tag() == "device") {
			let parent = device.parent.as_deref().unwrap();
			let wrapper = model.node(parent).unwrap();
			assert_eq!(wrapper.kind, NodeKind::DeviceWrapper { child: device.id.clone() });
		}
	}

	#[test]
	fn networks_without_gateway_link_straight_to_internet() {
		let model = build(&office(), &RenderState::default());
		let kinds: Vec<_> = ["net-1", "net-2", "net-3"]
			.iter()
			.map(|id| model.edge(&format!("e-internet-{id}")).unwrap().kind)
			.collect();
		assert_eq!(
			kinds,
			vec![EdgeKind::Membership, EdgeKind::InternetLink, EdgeKind::InternetLink]
		);
	}

	#[test]
	fn contained_gateway_replaces_direct_internet_edge() {
		let state = RenderState {
			gateway_roles: [("10.0.5.1".to_string(), "Ethernet default gateway".to_string())].into(),
			..Default::default()
		};
		let model = build(&office(), &state);

		assert!(model.edge("e-internet-net-2").is_none());
		assert!(model.edge("e-internet-net-1").is_some());

		let gateway = model.node("gw-10.0.5.1").unwrap();
		assert!(matches!(gateway.kind, NodeKind::Device(DeviceSource::VirtualGateway { .. })));
		assert_eq!(model.node("wrap-gw-10.0.5.1").unwrap().label, "Ethernet default gateway");

		let to_network = model.edge("e-gw-10.0.5.1-net-2").unwrap();
		assert_eq!((to_network.source.as_str(), to_network.kind), ("gw-10.0.5.1", EdgeKind::Membership));
		let route = model.edge("e-route-gw-10.0.5.1").unwrap();
		assert_eq!((route.target.as_str(), route.kind), (INTERNET_ID, EdgeKind::GatewayRoute));
	}

	#[test]
	fn registered_gateway_routes_directly() {
		let state = RenderState {
			gateway_roles: [("10.0.5.10".to_string(), "Ethernet default gateway".to_string())].into(),
			..Default::default()
		};
		let model = build(&office(), &state);
		assert!(model.node("gw-10.0.5.10").is_none());
		assert!(model.edge("e-internet-net-2").is_none());
		assert_eq!(model.edge("e-route-dev-2").unwrap().kind, EdgeKind::GatewayRoute);
		assert_eq!(model.node("wrap-dev-2").unwrap().label, "Ethernet default gateway");
	}

	#[test]
	fn invalid_subnet_always_links_to_internet() {
		let mut topology = office();
		topology.nodes.push(network(9, "Bluetooth", "bluetooth"));
		let state = RenderState {
			gateway_roles: [("10.0.5.1".to_string(), "gw".to_string())].into(),
			..Default::default()
		};
		let model = build(&topology, &state);
		assert_eq!(model.edge("e-internet-net-9").unwrap().kind, EdgeKind::Membership);
	}

	#[test]
	fn memberships_go_offline_outside_active_cidrs() {
		let state = RenderState {
			active_cidrs: ["192.168.1.0/24".to_string()].into(),
			..Default::default()
		};
		let model = build(&office(), &state);
		assert_eq!(model.edge("e-dev1-net1").unwrap().kind, EdgeKind::Membership);
		assert_eq!(model.edge("e-dev2-net2").unwrap().kind, EdgeKind::MembershipOffline);
		// no IP: never offline
		assert_eq!(model.edge("e-dev3-net1").unwrap().kind, EdgeKind::Membership);

		let all_online = build(&office(), &RenderState::default());
		assert_eq!(all_online.edges_of(EdgeKind::MembershipOffline).count(), 0);
	}

	#[test]
	fn dangling_memberships_are_dropped() {
		let mut topology = office();
		topology.edges.push(member(42, 1));
		let model = build(&topology, &RenderState::default());
		assert!(model.edge("e-dev42-net1").is_none());
	}

	#[test]
	fn my_device_gets_badge() {
		let state = RenderState {
			my_device: Some(1),
			..Default::default()
		};
		let model = build(&office(), &state);
		let wrapper = model.node("wrap-dev-1").unwrap();
		assert_eq!(wrapper.label, MY_DEVICE_BADGE);
		assert!(wrapper.is_my_device);
		assert_eq!(model.node("wrap-dev-2").unwrap().label, "");
	}

	#[test]
	fn bluetooth_links_follow_status() {
		let mut topology = office();
		let mut buds = device(10, Some("bt:AA:BB:CC:DD:EE:FF"), DeviceType::BtAudio);
		buds.status = DeviceStatus::Inactive;
		let mut mouse = device(11, Some("bt:MX Master"), DeviceType::BtInput);
		mouse.status = DeviceStatus::Active;
		topology.nodes.push(node(buds));
		topology.nodes.push(node(mouse));

		let without_me = build(&topology, &RenderState::default());
		assert_eq!(without_me.edges.iter().filter(|e| e.id.starts_with("e-bt-")).count(), 0);

		let state = RenderState {
			my_device: Some(1),
			..Default::default()
		};
		let model = build(&topology, &state);
		let buds_edge = model.edge("e-bt-dev-10").unwrap();
		assert_eq!(buds_edge.kind, EdgeKind::BluetoothInactive);
		assert_eq!(buds_edge.target, "dev-1");
		assert_eq!(model.edge("e-bt-dev-11").unwrap().kind, EdgeKind::BluetoothActive);
		assert_eq!(model.node("dev-11").unwrap().label, "🖱️\nhost-11\nMX Master");
	}

	#[test]
	fn labels_compose_glyph_name_and_address() {
		let model = build(&office(), &RenderState::default());
		assert_eq!(model.node("net-1").unwrap().label, "🏢 Office LAN\n192.168.1.0/24");
		assert_eq!(model.node("dev-1").unwrap().label, "💻\nhost-1\n192.168.1.20");
		assert_eq!(model.node("dev-3").unwrap().label, "📱\nhost-3");
	}

	#[test]
	fn overlay_colors_land_on_device_and_wrapper() {
		let mut topology = office();
		if let TopologyNode::Device { data, .. } = &mut topology.nodes[3] {
			data.solutions.push(AssignedSolution {
				name: "Defender".into(),
				kind: SolutionType::Antivirus,
				status: AssignmentStatus::Active,
			});
			data.vulnerabilities.push(Vulnerability {
				cve_id: None,
				title: "x".into(),
				severity: Severity::High,
				status: VulnerabilityStatus::Open,
			});
		}
		let palette = Palette::default();
		let state = RenderState {
			overlay: OverlayMode::Vulnerability,
			severity_filter: [Severity::Critical].into(),
			..Default::default()
		};
		let model = build(&topology, &state);
		assert_eq!(model.node("dev-1").unwrap().color, palette.high);
		assert_eq!(model.node("wrap-dev-1").unwrap().opacity, style::DIMMED_OPACITY);
		assert_eq!(model.node("dev-1").unwrap().opacity, 1.0);
	}

	#[test]
	fn heuristic_is_configurable() {
		let lab = Network {
			id: 1,
			name: "Lab".into(),
			subnet: Some("10.9.0.0/16".into()),
			gateway: None,
			vlan_id: None,
			description: None,
		};
		assert!(PublicSegmentHeuristic::default().is_public(&lab));
		let strict = PublicSegmentHeuristic {
			name_keywords: vec!["public".into()],
			reserved_ranges: Vec::new(),
		};
		assert!(!strict.is_public(&lab));
	}
}
