//! Error types for the backend client and configuration loading.

use thiserror::Error;

/// A failed backend request.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("request to {url} failed: {message}")]
	Transport { url: String, message: String },

	#[error("{url} answered {status}: {body}")]
	Status { url: String, status: u16, body: String },

	#[error("invalid response from {url}: {message}")]
	Decode { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid graph config: {0}")]
	Decode(#[from] serde_json::Error),
}
