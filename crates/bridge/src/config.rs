//! Bridge tuning knobs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime configuration of a [`Session`](crate::Session).
///
/// Every key is optional; unknown keys are rejected so typos surface early.
///
/// ```toml
/// idle_poll_ms = 1
/// disconnected_poll_ms = 10
/// string_padding = 8
/// thread_name = "simlink-dispatch"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
	/// Sleep after a poll that found nothing, in milliseconds.
	pub idle_poll_ms: u64,
	/// Sleep between connection checks while disconnected, in milliseconds.
	pub disconnected_poll_ms: u64,
	/// Bytes skipped before each variable-length string in a record.
	pub string_padding: usize,
	/// Name of the background dispatch thread.
	pub thread_name: String,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			idle_poll_ms: 1,
			disconnected_poll_ms: 10,
			string_padding: 8,
			thread_name: "simlink-dispatch".to_owned(),
		}
	}
}

impl BridgeConfig {
	/// Parses a TOML document.
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&input)
	}

	/// Pause after a poll that found nothing.
	pub fn idle_poll(&self) -> Duration {
		Duration::from_millis(self.idle_poll_ms)
	}

	/// Pause between connection checks while disconnected.
	pub fn disconnected_poll(&self) -> Duration {
		Duration::from_millis(self.disconnected_poll_ms)
	}
}
