//! Generation tagging for asynchronous fetches.
//!
//! Every request is stamped with a [`Generation`] when issued. A result is
//! applied only if no newer request was issued and the gate was not
//! invalidated in the meantime; anything else is stale and dropped.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use log::{debug, warn};

use crate::client::{InterfaceInfo, TopologyApi, Whoami};
use crate::error::ApiError;
use crate::topology::{Network, Topology};

/// Stamp carried by one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Shared, single-threaded generation counter. Clones observe the same counter.
#[derive(Clone, Debug, Default)]
pub struct RefreshGate {
	current: Rc<Cell<u64>>,
}

impl RefreshGate {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a request; any earlier generation becomes stale.
	pub fn issue(&self) -> Generation {
		let next = self.current.get() + 1;
		self.current.set(next);
		Generation(next)
	}

	/// Whether a result stamped `generation` may still be applied.
	pub fn accept(&self, generation: Generation) -> bool {
		self.current.get() == generation.0
	}

	/// Mark every in-flight request stale.
	pub fn invalidate(&self) {
		self.current.set(self.current.get() + 1);
	}

	/// Run `fetch` under a fresh generation.
	///
	/// Returns `None` when the result arrived after a newer request was issued
	/// or the gate was invalidated.
	pub async fn guard<T, F>(&self, what: &str, fetch: F) -> Option<T>
	where
		F: Future<Output = T>,
	{
		let generation = self.issue();
		let result = fetch.await;
		if self.accept(generation) {
			Some(result)
		} else {
			warn!("net-topology-graph: discarded stale {what} response");
			None
		}
	}
}

/// Topology and network list fetched in one refresh cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
	pub topology: Topology,
	pub networks: Vec<Network>,
}

/// One refresh cycle: best-effort Bluetooth status refresh, then topology and
/// networks. The Bluetooth step never fails the cycle.
pub async fn fetch_snapshot<A: TopologyApi + ?Sized>(api: &A) -> Result<Snapshot, ApiError> {
	if let Err(e) = api.refresh_bluetooth_status().await {
		warn!("net-topology-graph: bluetooth status refresh failed: {e}");
	}
	let topology = api.topology().await?;
	let networks = api.networks().await?;
	debug!(
		"net-topology-graph: fetched {} topology nodes, {} networks",
		topology.nodes.len(),
		networks.len()
	);
	Ok(Snapshot { topology, networks })
}

/// Interfaces and client identity, either of which may be unavailable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalContext {
	pub interfaces: Vec<InterfaceInfo>,
	pub whoami: Option<Whoami>,
}

/// Fetch interface and identity data. Failures degrade to empty values.
pub async fn fetch_local_context<A: TopologyApi + ?Sized>(api: &A) -> LocalContext {
	let interfaces = api.interfaces().await.unwrap_or_else(|e| {
		warn!("net-topology-graph: interface lookup failed: {e}");
		Vec::new()
	});
	let whoami = match api.whoami().await {
		Ok(whoami) => Some(whoami),
		Err(e) => {
			warn!("net-topology-graph: whoami failed: {e}");
			None
		}
	};
	LocalContext { interfaces, whoami }
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use async_trait::async_trait;
	use futures::executor::block_on;

	use super::*;
	use crate::client::DiscoveredHost;

	#[derive(Default)]
	struct FakeApi {
		bluetooth_fails: bool,
		topology_fails: bool,
		calls: RefCell<Vec<&'static str>>,
	}

	fn failure(url: &str) -> ApiError {
		ApiError::Status {
			url: url.to_string(),
			status: 500,
			body: String::new(),
		}
	}

	#[async_trait(?Send)]
	impl TopologyApi for FakeApi {
		async fn topology(&self) -> Result<Topology, ApiError> {
			self.calls.borrow_mut().push("topology");
			if self.topology_fails {
				return Err(failure("/api/topology/"));
			}
			Ok(Topology::default())
		}

		async fn networks(&self) -> Result<Vec<Network>, ApiError> {
			self.calls.borrow_mut().push("networks");
			Ok(Vec::new())
		}

		async fn whoami(&self) -> Result<Whoami, ApiError> {
			Err(failure("/api/whoami"))
		}

		async fn interfaces(&self) -> Result<Vec<InterfaceInfo>, ApiError> {
			Ok(vec![InterfaceInfo::default()])
		}

		async fn scan_network(&self, _cidr: &str) -> Result<Vec<DiscoveredHost>, ApiError> {
			Ok(Vec::new())
		}

		async fn refresh_bluetooth_status(&self) -> Result<(), ApiError> {
			self.calls.borrow_mut().push("bluetooth");
			if self.bluetooth_fails {
				return Err(failure("/api/bluetooth/refresh-status"));
			}
			Ok(())
		}
	}

	#[test]
	fn only_latest_generation_is_accepted() {
		let gate = RefreshGate::new();
		let first = gate.issue();
		let second = gate.issue();
		assert!(!gate.accept(first));
		assert!(gate.accept(second));
		gate.invalidate();
		assert!(!gate.accept(second));
	}

	#[test]
	fn clones_share_the_counter() {
		let gate = RefreshGate::new();
		let view = gate.clone();
		let generation = gate.issue();
		view.invalidate();
		assert!(!gate.accept(generation));
	}

	#[test]
	fn guard_drops_results_invalidated_in_flight() {
		let gate = RefreshGate::new();
		let applied = block_on(gate.guard("topology", async { 1 }));
		assert_eq!(applied, Some(1));

		let other = gate.clone();
		let stale = block_on(gate.guard("topology", async move {
			other.invalidate();
			2
		}));
		assert_eq!(stale, None);
	}

	#[test]
	fn bluetooth_failure_does_not_fail_refresh() {
		let api = FakeApi {
			bluetooth_fails: true,
			..Default::default()
		};
		assert!(block_on(fetch_snapshot(&api)).is_ok());
		assert_eq!(*api.calls.borrow(), vec!["bluetooth", "topology", "networks"]);
	}

	#[test]
	fn topology_failure_fails_refresh() {
		let api = FakeApi {
			topology_fails: true,
			..Default::default()
		};
		let err = block_on(fetch_snapshot(&api)).unwrap_err();
		assert!(matches!(err, ApiError::Status { status: 500, .. }));
		assert_eq!(*api.calls.borrow(), vec!["bluetooth", "topology"]);
	}

	#[test]
	fn local_context_degrades() {
		let context = block_on(fetch_local_context(&FakeApi::default()));
		assert_eq!(context.interfaces.len(), 1);
		assert_eq!(context.whoami, None);
	}
}
