//! Multi-subnet host discovery.

use std::collections::HashSet;

use log::{info, warn};

use crate::client::{DiscoveredHost, TopologyApi};

/// Scan each subnet in order and merge the hosts found.
///
/// A subnet whose scan fails is logged and skipped. Hosts are de-duplicated
/// by IP; the first report of an address wins.
pub async fn discover_subnets<A, I, S>(api: &A, cidrs: I) -> Vec<DiscoveredHost>
where
	A: TopologyApi + ?Sized,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = HashSet::new();
	let mut hosts = Vec::new();
	let mut failed = 0usize;

	for cidr in cidrs {
		let cidr = cidr.as_ref();
		match api.scan_network(cidr).await {
			Ok(found) => {
				for host in found {
					if seen.insert(host.ip_address.clone()) {
						hosts.push(host);
					}
				}
			}
			Err(e) => {
				failed += 1;
				warn!("net-topology-graph: scan of {cidr} failed: {e}");
			}
		}
	}

	info!(
		"net-topology-graph: discovery found {} hosts ({} subnets failed)",
		hosts.len(),
		failed
	);
	hosts
}
