//! Runtime configuration.
//!
//! ```toml
//! debounce_ms = 0
//! announce_ttl_ms = 1000
//! shadow_mode = "closed"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::template::ShadowMode;

/// Tunables shared by every element created through one runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
	/// Delay before a pending attribute change is applied. Zero defers to the
	/// next scheduler turn.
	pub debounce_ms: u64,
	/// How long a tag's registration announcement stays retained on the bus.
	pub announce_ttl_ms: u64,
	/// Mode used when a component does not declare one.
	pub shadow_mode: ShadowMode,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 0,
			announce_ttl_ms: 1000,
			shadow_mode: ShadowMode::Closed,
		}
	}
}

impl RuntimeConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn announce_ttl(&self) -> Duration {
		Duration::from_millis(self.announce_ttl_ms)
	}
}
