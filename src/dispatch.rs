//! Tap dispatch: maps a tapped node to an outbound selection event.

use crate::layout::Point;
use crate::model::{DeviceSource, NodeKind};
use crate::scene::Scene;
use crate::topology::Network;

/// Selection change published to whoever embeds the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
	DeviceSelected(DeviceSource),
	NetworkSelected(Network),
	Deselected,
}

/// Event for a tap on `node_id`, or on empty canvas when `None`.
pub fn dispatch(scene: &Scene, node_id: Option<&str>) -> SelectionEvent {
	let Some(node) = node_id.and_then(|id| scene.node(id)) else {
		return SelectionEvent::Deselected;
	};
	match &node.node.kind {
		NodeKind::Internet => SelectionEvent::Deselected,
		NodeKind::Network(network) => SelectionEvent::NetworkSelected(network.clone()),
		NodeKind::Device(source) => SelectionEvent::DeviceSelected(source.clone()),
		NodeKind::DeviceWrapper { child } => match scene.node(child).map(|n| &n.node.kind) {
			Some(NodeKind::Device(source)) => SelectionEvent::DeviceSelected(source.clone()),
			_ => SelectionEvent::Deselected,
		},
	}
}

/// Hit-test a graph-space point and dispatch the result.
pub fn tap(scene: &Scene, point: Point) -> SelectionEvent {
	let id = scene.node_at(point).map(|n| n.node.id.as_str());
	dispatch(scene, id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layout::seed_positions;
	use crate::model::build;
	use crate::render_state::RenderState;
	use crate::scene::NodeGeometry;
	use crate::topology::Topology;

	fn scene() -> Scene {
		let topology: Topology = serde_json::from_str(
			r#"{
			"nodes": [
				{"id": "net-1", "type": "network", "data": {"id": 1, "name": "LAN", "subnet": "192.168.1.0/24"}},
				{"id": "dev-7", "type": "device", "data": {"id": 7, "hostname": "nas", "ip_address": "192.168.1.7"}}
			],
			"edges": [{"id": "e1", "source": "dev-7", "target": "net-1"}]
		}"#,
		)
		.unwrap();
		let model = build(&topology, &RenderState::default());
		let positions = seed_positions(&model, 150.0);
		Scene::new(model, &positions, NodeGeometry::default(), 150.0)
	}

	fn selected_device_id(event: &SelectionEvent) -> Option<i64> {
		match event {
			SelectionEvent::DeviceSelected(DeviceSource::Registered(device)) => Some(device.id),
			_ => None,
		}
	}

	#[test]
	fn internet_and_empty_canvas_deselect() {
		let scene = scene();
		assert_eq!(dispatch(&scene, Some("internet")), SelectionEvent::Deselected);
		assert_eq!(dispatch(&scene, None), SelectionEvent::Deselected);
		assert_eq!(dispatch(&scene, Some("missing")), SelectionEvent::Deselected);
	}

	#[test]
	fn wrapper_resolves_to_its_device() {
		let scene = scene();
		assert_eq!(selected_device_id(&dispatch(&scene, Some("wrap-dev-7"))), Some(7));
		assert_eq!(selected_device_id(&dispatch(&scene, Some("dev-7"))), Some(7));
	}

	#[test]
	fn network_carries_its_data() {
		let scene = scene();
		match dispatch(&scene, Some("net-1")) {
			SelectionEvent::NetworkSelected(network) => assert_eq!(network.name, "LAN"),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn tap_hit_tests_positions() {
		let scene = scene();
		let device = scene.position("dev-7").unwrap();
		assert_eq!(selected_device_id(&tap(&scene, device)), Some(7));
		assert_eq!(tap(&scene, Point::new(1e6, 1e6)), SelectionEvent::Deselected);
	}
}
