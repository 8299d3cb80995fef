//! Browser-local persistence of the "my device" choice.

use log::warn;

use crate::topology::DeviceId;

/// `localStorage` key holding the chosen device id.
pub const MY_DEVICE_KEY: &str = "myDeviceId";

fn local_storage() -> Option<web_sys::Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

/// The remembered device, if storage is available and holds a valid id.
pub fn load_my_device() -> Option<DeviceId> {
	let raw = local_storage()?.get_item(MY_DEVICE_KEY).ok()??;
	parse_device_id(&raw)
}

pub fn store_my_device(id: DeviceId) {
	let Some(storage) = local_storage() else {
		warn!("net-topology-graph: localStorage unavailable; my device not saved");
		return;
	};
	if storage.set_item(MY_DEVICE_KEY, &id.to_string()).is_err() {
		warn!("net-topology-graph: could not save my device {id}");
	}
}

/// Ids are stored as decimal strings.
pub fn parse_device_id(raw: &str) -> Option<DeviceId> {
	raw.trim().parse().ok()
}
