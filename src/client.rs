//! Backend REST client.
//!
//! [`TopologyApi`] is the seam between the graph and the inventory backend;
//! [`HttpApi`] talks JSON to it over `reqwest`, which uses `fetch` on wasm32.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::topology::{Network, Topology};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// What the backend knows about the machine the browser runs on.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Whoami {
	/// Address the request arrived from.
	pub ip: Option<String>,
	pub local_ips: Vec<String>,
	/// Interface address (or name) to MAC.
	pub local_macs: BTreeMap<String, String>,
	pub os: Option<String>,
}

/// One local network interface.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InterfaceInfo {
	pub adapter: Option<String>,
	pub gateway: Option<String>,
	pub cidr: Option<String>,
}

/// A host found by a subnet scan.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveredHost {
	pub ip_address: String,
	pub hostname: Option<String>,
	pub mac_address: Option<String>,
	pub already_registered: bool,
}

#[derive(Serialize)]
struct ScanRequest<'a> {
	cidr: &'a str,
}

/// Read side of the inventory backend.
///
/// Futures are `?Send` because browser fetches are bound to the main thread.
#[async_trait(?Send)]
pub trait TopologyApi {
	async fn topology(&self) -> Result<Topology, ApiError>;
	async fn networks(&self) -> Result<Vec<Network>, ApiError>;
	async fn whoami(&self) -> Result<Whoami, ApiError>;
	async fn interfaces(&self) -> Result<Vec<InterfaceInfo>, ApiError>;
	/// Probe one subnet for live hosts.
	async fn scan_network(&self, cidr: &str) -> Result<Vec<DiscoveredHost>, ApiError>;
	/// Ask the backend to re-poll paired Bluetooth peripherals.
	async fn refresh_bluetooth_status(&self) -> Result<(), ApiError>;
}

/// JSON-over-HTTP implementation of [`TopologyApi`].
#[derive(Clone, Debug)]
pub struct HttpApi {
	base_url: String,
	http: Client,
}

impl Default for HttpApi {
	fn default() -> Self {
		Self::new(DEFAULT_BASE_URL)
	}
}

impl HttpApi {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			http: Client::new(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = self.url(path);
		let response = self
			.http
			.get(&url)
			.header("Accept", "application/json")
			.send()
			.await
			.map_err(|e| transport(&url, e))?;
		decode(url, response).await
	}

	async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
		let url = self.url(path);
		let response = self
			.http
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(|e| transport(&url, e))?;
		decode(url, response).await
	}
}

/// Endpoint paths relative to the base URL.
mod paths {
	pub const TOPOLOGY: &str = "/api/topology/";
	pub const NETWORKS: &str = "/api/networks/";
	pub const WHOAMI: &str = "/api/whoami";
	pub const INTERFACES: &str = "/api/interfaces";
	pub const SCAN: &str = "/api/scan/";
	/// Bluetooth routes live under the scan router.
	pub const BLUETOOTH_REFRESH: &str = "/api/scan/bluetooth/refresh-status";
}

fn transport(url: &str, e: reqwest::Error) -> ApiError {
	ApiError::Transport {
		url: url.to_string(),
		message: e.to_string(),
	}
}

async fn decode<T: DeserializeOwned>(url: String, response: reqwest::Response) -> Result<T, ApiError> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		return Err(ApiError::Status {
			url,
			status: status.as_u16(),
			body: body.chars().take(200).collect(),
		});
	}
	response.json().await.map_err(|e| ApiError::Decode {
		message: e.to_string(),
		url,
	})
}

#[async_trait(?Send)]
impl TopologyApi for HttpApi {
	async fn topology(&self) -> Result<Topology, ApiError> {
		self.get(paths::TOPOLOGY).await
	}

	async fn networks(&self) -> Result<Vec<Network>, ApiError> {
		self.get(paths::NETWORKS).await
	}

	async fn whoami(&self) -> Result<Whoami, ApiError> {
		self.get(paths::WHOAMI).await
	}

	async fn interfaces(&self) -> Result<Vec<InterfaceInfo>, ApiError> {
		self.get(paths::INTERFACES).await
	}

	async fn scan_network(&self, cidr: &str) -> Result<Vec<DiscoveredHost>, ApiError> {
		self.post(paths::SCAN, &ScanRequest { cidr }).await
	}

	async fn refresh_bluetooth_status(&self) -> Result<(), ApiError> {
		let url = self.url(paths::BLUETOOTH_REFRESH);
		let response = self
			.http
			.post(&url)
			.send()
			.await
			.map_err(|e| transport(&url, e))?;
		let status = response.status();
		if status.is_success() {
			return Ok(());
		}
		Err(ApiError::Status {
			url,
			status: status.as_u16(),
			body: response.text().await.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_url_is_normalized() {
		let api = HttpApi::new("http://inventory.local:8080/");
		assert_eq!(api.base_url(), "http://inventory.local:8080");
		assert_eq!(api.url("/api/whoami"), "http://inventory.local:8080/api/whoami");
		assert_eq!(HttpApi::default().base_url(), DEFAULT_BASE_URL);
	}

	#[test]
	fn bluetooth_refresh_goes_through_the_scan_router() {
		let api = HttpApi::new("http://inventory.local:8080");
		assert_eq!(
			api.url(paths::BLUETOOTH_REFRESH),
			"http://inventory.local:8080/api/scan/bluetooth/refresh-status"
		);
		assert_eq!(api.url(paths::SCAN), "http://inventory.local:8080/api/scan/");
	}

	#[test]
	fn wire_types_tolerate_missing_fields() {
		let whoami: Whoami = serde_json::from_str(r#"{"ip": "10.0.0.5"}"#).unwrap();
		assert_eq!(whoami.ip.as_deref(), Some("10.0.0.5"));
		assert!(whoami.local_ips.is_empty());

		let hosts: Vec<DiscoveredHost> = serde_json::from_str(
			r#"[{"ip_address": "10.0.0.9", "hostname": null, "mac_address": "AA", "already_registered": true}]"#,
		)
		.unwrap();
		assert!(hosts[0].already_registered);
		assert_eq!(hosts[0].hostname, None);
	}

	#[test]
	fn scan_request_shape() {
		let body = serde_json::to_value(ScanRequest { cidr: "10.0.0.0/24" }).unwrap();
		assert_eq!(body, serde_json::json!({"cidr": "10.0.0.0/24"}));
	}
}
