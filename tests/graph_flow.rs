//! End-to-end flow through the public API: snapshot in, scene and selections out.

#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use net_topology_graph::client::InterfaceInfo;
use net_topology_graph::dispatch::{SelectionEvent, dispatch};
use net_topology_graph::layout::{LayoutEngine, Positions, seed_positions};
use net_topology_graph::model::{DeviceSource, EdgeKind, GraphBuilder, GraphModel};
use net_topology_graph::reconcile::{GraphController, Transition};
use net_topology_graph::render_state::{InterfaceState, OverlayMode, RenderState};
use net_topology_graph::style::DIMMED_OPACITY;
use net_topology_graph::topology::{Severity, Topology};

struct SeedLayout;

impl LayoutEngine for SeedLayout {
	fn layout(&mut self, model: &GraphModel) -> Positions {
		seed_positions(model, 120.0)
	}
}

fn office() -> Arc<Topology> {
	Arc::new(
		serde_json::from_str(
			r#"{
			"nodes": [
				{"id": "net-1", "type": "network", "data": {"id": 1, "name": "Office LAN", "subnet": "192.168.1.0/24"}},
				{"id": "net-2", "type": "network", "data": {"id": 2, "name": "DMZ", "subnet": "172.16.0.0/24"}},
				{"id": "dev-1", "type": "device", "data": {
					"id": 1, "hostname": "laptop", "ip_address": "192.168.1.10", "status": "active",
					"solutions": [{"name": "Defender", "type": "antivirus", "status": "active"}]
				}},
				{"id": "dev-2", "type": "device", "data": {
					"id": 2, "hostname": "web", "ip_address": "172.16.0.5", "device_type": "server",
					"vulnerabilities": [{"cve_id": "CVE-2024-0001", "title": "RCE", "severity": "critical"}]
				}},
				{"id": "dev-3", "type": "device", "data": {
					"id": 3, "hostname": "headset", "ip_address": "bt:AA:BB:CC:DD:EE:FF", "status": "inactive"
				}},
				{"id": "dev-4", "type": "device", "data": {
					"id": 4, "hostname": "router", "ip_address": "192.168.1.1", "device_type": "router"
				}}
			],
			"edges": [
				{"id": "e1", "source": "dev-1", "target": "net-1"},
				{"id": "e2", "source": "dev-2", "target": "net-2"},
				{"id": "e4", "source": "dev-4", "target": "net-1"}
			]
		}"#,
		)
		.unwrap(),
	)
}

fn local_state() -> RenderState {
	let interfaces = InterfaceState::from_interfaces(&[InterfaceInfo {
		adapter: Some("Wi-Fi".to_string()),
		gateway: Some("192.168.1.1".to_string()),
		cidr: Some("192.168.1.0/24".to_string()),
	}]);
	RenderState {
		my_device: Some(1),
		..Default::default()
	}
	.with_interfaces(interfaces)
}

fn controller() -> GraphController<SeedLayout> {
	GraphController::new(GraphBuilder::default(), SeedLayout, 120.0, 40.0)
}

#[test]
fn edges_reflect_local_network_context() {
	let mut controller = controller();
	controller.reconcile(&office(), &local_state());
	let scene = controller.scene().unwrap();
	let kind_of = |id: &str| scene.edges().iter().find(|e| e.id == id).map(|e| e.kind);

	// The local gateway routes the office LAN, so no direct internet edge.
	assert_eq!(kind_of("e-internet-net-1"), None);
	assert_eq!(kind_of("e-route-dev-4"), Some(EdgeKind::GatewayRoute));
	assert_eq!(kind_of("e-internet-net-2"), Some(EdgeKind::InternetLink));

	assert_eq!(kind_of("e1"), Some(EdgeKind::Membership));
	assert_eq!(kind_of("e2"), Some(EdgeKind::MembershipOffline));
	assert_eq!(kind_of("e-bt-dev-3"), Some(EdgeKind::BluetoothInactive));

	let router = scene.node("wrap-dev-4").unwrap();
	assert_eq!(router.node.label, "Wi-Fi default gateway");
}

#[test]
fn overlay_changes_restyle_without_moving_anything() {
	let mut controller = controller();
	let snapshot = office();
	let state = local_state();
	assert_eq!(controller.reconcile(&snapshot, &state), Transition::Structural);
	let before = controller.scene().unwrap().positions();

	let mut vulnerable = state.clone();
	vulnerable.toggle_vulnerability();
	vulnerable.toggle_severity_filter(Severity::Critical);
	assert_eq!(vulnerable.overlay, OverlayMode::Vulnerability);

	let transition = controller.reconcile(&snapshot, &vulnerable);
	assert!(matches!(transition, Transition::Attribute(_)));
	assert_eq!(controller.layout_runs(), 1);

	let scene = controller.scene().unwrap();
	assert_eq!(scene.positions(), before);
	let laptop = &scene.node("dev-1").unwrap().node;
	let web = &scene.node("dev-2").unwrap().node;
	assert!((scene.opacity(laptop) - DIMMED_OPACITY).abs() < 1e-9);
	assert!((scene.opacity(web) - 1.0).abs() < 1e-9);
}

#[test]
fn switching_my_device_keeps_the_layout() {
	let mut controller = controller();
	let snapshot = office();
	controller.reconcile(&snapshot, &local_state());
	let before = controller.scene().unwrap().positions();

	let moved = RenderState {
		my_device: Some(2),
		..local_state()
	};
	controller.reconcile(&snapshot, &moved);

	let scene = controller.scene().unwrap();
	assert_eq!(scene.positions(), before);
	assert!(scene.node("wrap-dev-2").unwrap().node.is_my_device);
	assert!(!scene.node("wrap-dev-1").unwrap().node.is_my_device);
	let bt = scene.edges().iter().find(|e| e.id == "e-bt-dev-3").unwrap();
	assert_eq!(bt.target, "dev-2");
}

#[test]
fn a_fresh_snapshot_is_laid_out_again() {
	let mut controller = controller();
	controller.reconcile(&office(), &local_state());
	assert_eq!(
		controller.reconcile(&office(), &local_state()),
		Transition::Structural
	);
	assert_eq!(controller.layout_runs(), 2);
}

#[test]
fn taps_resolve_to_selection_events() {
	let mut controller = controller();
	controller.reconcile(&office(), &local_state());
	let scene = controller.scene().unwrap();

	assert_eq!(dispatch(scene, None), SelectionEvent::Deselected);
	assert_eq!(dispatch(scene, Some("internet")), SelectionEvent::Deselected);

	match dispatch(scene, Some("wrap-dev-2")) {
		SelectionEvent::DeviceSelected(DeviceSource::Registered(device)) => {
			assert_eq!(device.hostname, "web")
		}
		other => panic!("unexpected {other:?}"),
	}
	match dispatch(scene, Some("net-2")) {
		SelectionEvent::NetworkSelected(network) => assert_eq!(network.name, "DMZ"),
		other => panic!("unexpected {other:?}"),
	}
}
