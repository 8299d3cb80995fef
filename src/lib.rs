//! net-topology-graph: interactive network topology diagram for a security
//! inventory backend.
//!
//! The core turns a backend topology snapshot plus client-side render state
//! into a styled graph model, lays it out once per new snapshot, and restyles
//! it in place when only the render state changes. The core modules are DOM
//! free; [`components`] and [`App`] put them on a canvas.

use std::sync::Arc;
use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod cidr;
pub mod client;
pub mod components;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod persist;
pub mod reconcile;
pub mod refresh;
pub mod render_state;
pub mod scene;
pub mod style;
pub mod topology;

pub use client::{HttpApi, TopologyApi};
pub use components::topology_graph::TopologyGraphCanvas;
pub use config::GraphConfig;
pub use dispatch::SelectionEvent;
pub use reconcile::{GraphController, Transition};
pub use render_state::RenderState;
pub use topology::Topology;

use components::details::SelectionPanel;
use components::toolbar::OverlayToolbar;
use discovery::discover_subnets;
use refresh::{RefreshGate, fetch_local_context, fetch_snapshot};
use render_state::{InterfaceState, detect_my_device};
use topology::{DeviceId, Network};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("net-topology-graph: logging initialized");
}

/// Load configuration from a script element with id="graph-config".
/// Missing element means defaults; invalid JSON means defaults plus a warning.
fn load_config() -> GraphConfig {
	let Some(json_text) = config_text() else {
		return GraphConfig::default();
	};
	match GraphConfig::from_json(&json_text) {
		Ok(config) => {
			info!("net-topology-graph: using backend {}", config.api_base_url);
			config
		}
		Err(e) => {
			warn!("net-topology-graph: {e}; using defaults");
			GraphConfig::default()
		}
	}
}

/// Apply an automatic "my device" detection and remember it.
/// Failed detections leave the current choice alone.
fn adopt_detected(render_state: RwSignal<RenderState>, detected: Option<DeviceId>) {
	let Some(id) = detected else {
		return;
	};
	if render_state.with_untracked(|s| s.my_device == Some(id)) {
		return;
	}
	render_state.update(|s| {
		s.adopt_detected(detected);
	});
	persist::store_my_device(id);
	info!("net-topology-graph: my device is {id}");
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Main application component.
///
/// Polls the backend, derives render state from local interfaces and the
/// client identity, and renders the topology with overlay controls.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let api = Arc::new(HttpApi::new(config.api_base_url.clone()));
	let gate = RefreshGate::new();

	let topology = RwSignal::new(None::<Arc<Topology>>);
	let render_state = RwSignal::new(RenderState {
		my_device: persist::load_my_device(),
		..Default::default()
	});
	let networks = RwSignal::new(Vec::<Network>::new());
	let whoami = RwSignal::new(None::<client::Whoami>);
	let selection = RwSignal::new(None::<SelectionEvent>);
	let error = RwSignal::new(None::<String>);
	let discovered = RwSignal::new(Vec::<client::DiscoveredHost>::new());
	let scanning = RwSignal::new(false);

	let refresh = {
		let (api, gate) = (api.clone(), gate.clone());
		move || {
			let (api, gate) = (api.clone(), gate.clone());
			spawn_local(async move {
				let Some(result) = gate.guard("topology", fetch_snapshot(api.as_ref())).await else {
					return;
				};
				let snapshot = match result {
					Ok(snapshot) => snapshot,
					Err(e) => {
						warn!("net-topology-graph: topology refresh failed: {e}");
						error.set(Some(format!("Could not load topology: {e}")));
						return;
					}
				};
				error.set(None);

				let detected = detect_my_device(&snapshot.topology, whoami.get_untracked().as_ref());
				adopt_detected(render_state, detected);
				if networks.with_untracked(|n| *n != snapshot.networks) {
					networks.set(snapshot.networks);
				}
				// Keep the current snapshot when nothing changed so the layout stays put.
				let unchanged = topology.with_untracked(|t| t.as_deref() == Some(&snapshot.topology));
				if unchanged {
					debug!("net-topology-graph: topology unchanged");
				} else {
					topology.set(Some(Arc::new(snapshot.topology)));
				}
			});
		}
	};

	{
		let api = api.clone();
		spawn_local(async move {
			let context = fetch_local_context(api.as_ref()).await;
			let interfaces = InterfaceState::from_interfaces(&context.interfaces);
			let detected = topology.with_untracked(|t| {
				t.as_deref()
					.and_then(|t| detect_my_device(t, context.whoami.as_ref()))
			});
			render_state.update(|s| *s = std::mem::take(s).with_interfaces(interfaces));
			adopt_detected(render_state, detected);
			whoami.set(context.whoami);
		});
	}

	refresh();
	let poll = refresh.clone();
	let interval = set_interval_with_handle(
		move || poll(),
		Duration::from_millis(u64::from(config.poll_interval_ms)),
	)
	.ok();

	let cleanup_gate = StoredValue::new_local(gate);
	on_cleanup(move || {
		if let Some(handle) = interval {
			handle.clear();
		}
		cleanup_gate.try_with_value(RefreshGate::invalidate);
	});

	let scan = move |_| {
		let api = api.clone();
		let cidrs: Vec<String> = render_state.with_untracked(|s| s.active_cidrs.iter().cloned().collect());
		scanning.set(true);
		spawn_local(async move {
			let hosts = discover_subnets(api.as_ref(), cidrs).await;
			discovered.set(hosts);
			scanning.set(false);
		});
	};

	let on_select = Callback::new(move |event: SelectionEvent| {
		selection.set(match event {
			SelectionEvent::Deselected => None,
			other => Some(other),
		});
	});

	let on_set_my_device = Callback::new(move |id: DeviceId| {
		render_state.update(|s| s.my_device = Some(id));
		persist::store_my_device(id);
		info!("net-topology-graph: my device set to {id}");
	});
	let my_device = Signal::derive(move || render_state.with(|s| s.my_device));
	let network_count = Signal::derive(move || networks.with(Vec::len));

	let unregistered = move || {
		discovered.with(|hosts| hosts.iter().filter(|h| !h.already_registered).count())
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<TopologyGraphCanvas
				topology=topology
				render_state=render_state
				on_select=on_select
				config=config
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Network Topology"</h1>
				<p class="subtitle">"Scroll to zoom. Drag background to pan. Click a node for details."</p>
				{move || error.get().map(|message| view! { <div class="error-banner">{message}</div> })}
				<OverlayToolbar render_state=render_state network_count=network_count />
				<button class="scan" disabled=move || scanning.get() on:click=scan>
					{move || if scanning.get() { "Scanning…" } else { "🔍 Scan local subnets" }}
				</button>
				<Show when=move || !discovered.with(Vec::is_empty)>
					<p class="scan-result">
						{move || format!("{} hosts found, {} not registered", discovered.with(Vec::len), unregistered())}
					</p>
				</Show>
			</div>
			<SelectionPanel selection=selection my_device=my_device on_set_my_device=on_set_my_device />
		</div>
	}
}
