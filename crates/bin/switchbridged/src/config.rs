//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `switchbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use switchbridge_adapter_ble::BleConfig;
use switchbridge_adapter_virtual::VirtualHostConfig;
use switchbridge_app::platform::BridgeSettings;
use switchbridge_app::ports::DiscoverOptions;
use switchbridge_domain::error::BridgeError;

const CONFIG_FILE: &str = "switchbridge.toml";

const DEFAULT_FILTER: &str = "switchbridged=info,switchbridge_app=info,switchbridge_adapter_ble=info,switchbridge_adapter_virtual=info";
const DEBUG_FILTER: &str = "switchbridged=debug,switchbridge_app=debug,switchbridge_adapter_ble=debug,switchbridge_adapter_virtual=debug";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bridge behaviour.
    pub bridge: BridgeConfig,
    /// BLE transport settings.
    pub ble: BleConfig,
    /// Host platform settings.
    pub host: HostConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Bridge behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Addresses the bridge may manage, any case.
    pub device_addresses: Vec<String>,
    /// Remove every bridged device from the host on shutdown.
    pub unregister_on_shutdown: bool,
    /// Log bridge internals at debug level.
    pub debug: bool,
    /// Upper bound on waiting for a device's update lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

/// Host platform identity and validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub vendor_id: u16,
    pub vendor_name: String,
    pub host_version: String,
    /// Device names the host refuses to expose.
    pub reject_names: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `switchbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SWITCHBRIDGE_DEVICES") {
            self.bridge.device_addresses = val
                .split(',')
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(flag) = lookup("SWITCHBRIDGE_DEBUG").as_deref().and_then(parse_flag) {
            self.bridge.debug = flag;
        }
        if let Some(flag) = lookup("SWITCHBRIDGE_UNREGISTER_ON_SHUTDOWN")
            .as_deref()
            .and_then(parse_flag)
        {
            self.bridge.unregister_on_shutdown = flag;
        }
        if let Some(val) = lookup("SWITCHBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.lock_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "lock_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.ble.discovery_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "discovery_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.ble.command_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "command_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Filter directive for the subscriber. The debug flag wins over the
    /// configured filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        if self.bridge.debug {
            DEBUG_FILTER
        } else {
            &self.logging.filter
        }
    }

    /// Validated bridge settings.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigInvalid`] when a configured address does
    /// not parse.
    pub fn bridge_settings(&self) -> Result<BridgeSettings, BridgeError> {
        Ok(BridgeSettings::new(
            &self.bridge.device_addresses,
            self.bridge.unregister_on_shutdown,
        )?
        .with_lock_timeout(Duration::from_millis(self.bridge.lock_timeout_ms))
        .with_discover_options(DiscoverOptions {
            timeout: self.ble.discovery_timeout(),
        }))
    }

    /// Configuration of the in-process host.
    #[must_use]
    pub fn host_config(&self) -> VirtualHostConfig {
        VirtualHostConfig {
            vendor_id: self.host.vendor_id,
            vendor_name: self.host.vendor_name.clone(),
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
            host_version: self.host.host_version.clone(),
            reject_names: self.host.reject_names.clone(),
            ..VirtualHostConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_addresses: Vec::new(),
            unregister_on_shutdown: false,
            debug: false,
            lock_timeout_ms: 4_000,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        let host = VirtualHostConfig::default();
        Self {
            vendor_id: host.vendor_id,
            vendor_name: host.vendor_name,
            host_version: host.host_version,
            reject_names: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    use switchbridge_domain::address::DeviceAddress;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert!(config.bridge.device_addresses.is_empty());
        assert!(!config.bridge.unregister_on_shutdown);
        assert!(!config.bridge.debug);
        assert_eq!(config.bridge.lock_timeout_ms, 4_000);
        assert_eq!(config.ble.discovery_timeout_secs, 5);
        assert_eq!(config.host.vendor_id, 0xFFF1);
        assert_eq!(config.log_filter(), DEFAULT_FILTER);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bridge.lock_timeout_ms, 4_000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [bridge]
            device_addresses = ['C4:7C:8D:6A:12:34', 'aa:bb:cc:dd:ee:ff']
            unregister_on_shutdown = true
            debug = true
            lock_timeout_ms = 2500

            [ble]
            discovery_timeout_secs = 8
            command_timeout_secs = 4
            adapter_index = 1

            [host]
            vendor_id = 4660
            vendor_name = 'Acme'
            host_version = '3.3.0'
            reject_names = ['Curtain aa:bb:cc:dd:ee:ff']

            [logging]
            filter = 'trace'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bridge.device_addresses.len(), 2);
        assert!(config.bridge.unregister_on_shutdown);
        assert!(config.bridge.debug);
        assert_eq!(config.bridge.lock_timeout_ms, 2_500);
        assert_eq!(config.ble.discovery_timeout_secs, 8);
        assert_eq!(config.ble.command_timeout_secs, 4);
        assert_eq!(config.ble.adapter_index, 1);
        assert_eq!(config.host.vendor_id, 0x1234);
        assert_eq!(config.host.vendor_name, "Acme");
        assert_eq!(config.host.reject_names.len(), 1);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.bridge.lock_timeout_ms, 4_000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_lock_timeout() {
        let mut config = Config::default();
        config.bridge.lock_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_command_timeout() {
        let mut config = Config::default();
        config.ble.command_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_override_devices_from_env() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SWITCHBRIDGE_DEVICES", " AA:BB:CC , ,dd:ee:ff")]));
        assert_eq!(config.bridge.device_addresses, vec!["AA:BB:CC", "dd:ee:ff"]);
    }

    #[test]
    fn should_override_flags_from_env() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SWITCHBRIDGE_DEBUG", "true"),
            ("SWITCHBRIDGE_UNREGISTER_ON_SHUTDOWN", "1"),
        ]));
        assert!(config.bridge.debug);
        assert!(config.bridge.unregister_on_shutdown);
    }

    #[test]
    fn should_ignore_unparseable_flag() {
        let mut config = Config::default();
        config.bridge.debug = true;
        config.apply_overrides(env(&[("SWITCHBRIDGE_DEBUG", "maybe")]));
        assert!(config.bridge.debug);
    }

    #[test]
    fn should_prefer_rust_log_over_switchbridge_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SWITCHBRIDGE_LOG", "warn"), ("RUST_LOG", "error")]));
        assert_eq!(config.logging.filter, "error");
    }

    #[test]
    fn should_raise_filter_in_debug_mode() {
        let mut config = Config::default();
        config.bridge.debug = true;
        assert_eq!(config.log_filter(), DEBUG_FILTER);
    }

    #[test]
    fn should_build_settings_from_valid_addresses() {
        let mut config = Config::default();
        config.bridge.device_addresses = vec!["C4:7C:8D:6A:12:34".to_string()];
        config.bridge.lock_timeout_ms = 1_500;

        let settings = config.bridge_settings().unwrap();
        assert!(
            settings
                .allow_list()
                .contains(&DeviceAddress::new("c4:7c:8d:6a:12:34"))
        );
        assert_eq!(settings.lock_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn should_reject_invalid_address() {
        let mut config = Config::default();
        config.bridge.device_addresses = vec!["kitchen curtain".to_string()];
        assert!(matches!(
            config.bridge_settings(),
            Err(BridgeError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn should_pass_host_settings_to_virtual_host() {
        let mut config = Config::default();
        config.host.reject_names = vec!["Curtain aa".to_string()];
        config.host.host_version = "3.3.0".to_string();

        let host = config.host_config();
        assert_eq!(host.reject_names, vec!["Curtain aa".to_string()]);
        assert_eq!(host.host_version, "3.3.0");
        assert_eq!(host.plugin_version, env!("CARGO_PKG_VERSION"));
    }
}
