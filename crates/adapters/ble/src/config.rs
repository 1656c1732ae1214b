//! BLE adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the SwitchBot BLE transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// How long the initial discovery pass listens, in seconds.
    pub discovery_timeout_secs: u16,
    /// Upper bound on one GATT command exchange, in seconds.
    pub command_timeout_secs: u16,
    /// Which host adapter to use when several are present.
    pub adapter_index: usize,
}

impl BleConfig {
    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.discovery_timeout_secs))
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.command_timeout_secs))
    }
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_secs: 5,
            command_timeout_secs: 10,
            adapter_index: 0,
        }
    }
}
