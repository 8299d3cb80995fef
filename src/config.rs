//! Page-level configuration embedded as JSON.

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::layout::LayoutConfig;
use crate::model::PublicSegmentHeuristic;

/// Every field is optional in the JSON; missing ones take their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Backend origin, without a trailing `/api`.
	pub api_base_url: String,
	/// Delay between topology refreshes.
	pub poll_interval_ms: u32,
	pub layout: LayoutConfig,
	pub public_segments: PublicSegmentHeuristic,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_BASE_URL.to_string(),
			poll_interval_ms: 30_000,
			layout: LayoutConfig::default(),
			public_segments: PublicSegmentHeuristic::default(),
		}
	}
}

impl GraphConfig {
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}
}
