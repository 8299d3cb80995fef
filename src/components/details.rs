//! Side panel describing the current selection.

use leptos::prelude::*;

use crate::dispatch::SelectionEvent;
use crate::model::DeviceSource;
use crate::overlay::{self, CoverageStatus};
use crate::style::MY_DEVICE_BADGE;
use crate::topology::{Device, DeviceId, Network};

/// Details of the selected node. Registered devices can be marked as the
/// machine running this browser through `on_set_my_device`.
#[component]
pub fn SelectionPanel(
	selection: RwSignal<Option<SelectionEvent>>,
	#[prop(into)] my_device: Signal<Option<DeviceId>>,
	#[prop(into)] on_set_my_device: Callback<DeviceId>,
) -> impl IntoView {
	move || {
		let mine = my_device.get();
		selection.get().map(|event| {
			let body = match event {
				SelectionEvent::DeviceSelected(DeviceSource::Registered(device)) => {
					device_view(device, mine, on_set_my_device).into_any()
				}
				SelectionEvent::DeviceSelected(DeviceSource::VirtualGateway { ip, role }) => view! {
					<h2>"gateway"</h2>
					<dl>
						<dt>"IP"</dt><dd>{ip}</dd>
						<dt>"Role"</dt><dd>{role}</dd>
					</dl>
					<p class="hint">"Seen on a local interface; not registered."</p>
				}
				.into_any(),
				SelectionEvent::NetworkSelected(network) => network_view(network).into_any(),
				SelectionEvent::Deselected => ().into_any(),
			};
			view! {
				<aside class="selection-panel">
					<button class="close" on:click=move |_| selection.set(None)>"×"</button>
					{body}
				</aside>
			}
		})
	}
}

fn device_view(device: Device, mine: Option<DeviceId>, on_set_my_device: Callback<DeviceId>) -> impl IntoView {
	let id = device.id;
	let marker = if mine == Some(id) {
		view! { <p class="my-device">{MY_DEVICE_BADGE}</p> }.into_any()
	} else {
		view! {
			<button class="set-my-device" on:click=move |_| on_set_my_device.run(id)>
				"📍 Set as my device"
			</button>
		}
		.into_any()
	};

	let coverage = match overlay::coverage_status(&device) {
		CoverageStatus::Full => "full",
		CoverageStatus::Partial => "partial",
		CoverageStatus::Missing => "none",
	};
	let worst = overlay::highest_open_severity(&device).map_or("none", |s| s.as_str());
	let open = device.open_vulnerabilities().count();
	let solutions = device
		.solutions
		.iter()
		.map(|s| {
			let state = if s.is_active() { "active" } else { "inactive" };
			view! { <li>{format!("{} ({}, {state})", s.name, s.kind.as_str())}</li> }
		})
		.collect_view();

	view! {
		<h2>{device.hostname.clone()}</h2>
		{marker}
		<dl>
			<dt>"IP"</dt><dd>{device.ip_address.clone().unwrap_or_default()}</dd>
			<dt>"MAC"</dt><dd>{device.mac_address.clone().unwrap_or_default()}</dd>
			<dt>"Vendor"</dt><dd>{device.vendor.clone().unwrap_or_default()}</dd>
			<dt>"OS"</dt><dd>{device.os.clone().unwrap_or_default()}</dd>
			<dt>"Coverage"</dt><dd>{coverage}</dd>
			<dt>"Open vulnerabilities"</dt><dd>{format!("{open} (worst: {worst})")}</dd>
		</dl>
		<ul class="solutions">{solutions}</ul>
	}
}

fn network_view(network: Network) -> impl IntoView {
	view! {
		<h2>{network.name}</h2>
		<dl>
			<dt>"Subnet"</dt><dd>{network.subnet.unwrap_or_default()}</dd>
			<dt>"Gateway"</dt><dd>{network.gateway.unwrap_or_default()}</dd>
			<dt>"VLAN"</dt><dd>{network.vlan_id.map(|v| v.to_string()).unwrap_or_default()}</dd>
		</dl>
		<p>{network.description.unwrap_or_default()}</p>
	}
}
