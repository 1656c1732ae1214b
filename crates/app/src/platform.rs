//! Platform lifecycle — what the host calls into.
//!
//! [`BridgeSettings`] is the validated configuration: a platform cannot be
//! built from an invalid one, so a bad allow-list stops the bridge before
//! `on_start` is ever reached.

use std::sync::Arc;
use std::time::Duration;

use switchbridge_domain::address::{AllowList, DeviceAddress};
use switchbridge_domain::command::CoverCommand;
use switchbridge_domain::error::BridgeError;

use crate::factory::DEFAULT_LOCK_TIMEOUT;
use crate::orchestrator::Orchestrator;
use crate::ports::{BleTransport, DiscoverOptions, HostPlatform, LogLevelControl};

/// Validated bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    allow_list: AllowList,
    unregister_on_shutdown: bool,
    lock_timeout: Duration,
    discover_options: DiscoverOptions,
}

impl BridgeSettings {
    /// Validate the configured addresses.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigInvalid`] when any address does not
    /// parse.
    pub fn new<I, S>(device_addresses: I, unregister_on_shutdown: bool) -> Result<Self, BridgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            allow_list: AllowList::parse(device_addresses)?,
            unregister_on_shutdown,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            discover_options: DiscoverOptions::default(),
        })
    }

    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    #[must_use]
    pub fn with_discover_options(mut self, discover_options: DiscoverOptions) -> Self {
        self.discover_options = discover_options;
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn unregister_on_shutdown(&self) -> bool {
        self.unregister_on_shutdown
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

/// The SwitchBot bridge, as loaded by a host.
pub struct SwitchBotPlatform<T: BleTransport, H> {
    host: H,
    orchestrator: Orchestrator<T, H>,
    unregister_on_shutdown: bool,
    log_control: Option<Box<dyn LogLevelControl>>,
}

impl<T, H> SwitchBotPlatform<T, H>
where
    T: BleTransport,
    H: HostPlatform,
{
    pub fn new(transport: Arc<T>, host: H, settings: BridgeSettings) -> Self {
        let orchestrator = Orchestrator::new(
            transport,
            host.clone(),
            settings.allow_list,
            settings.discover_options,
            settings.lock_timeout,
        );
        Self {
            host,
            orchestrator,
            unregister_on_shutdown: settings.unregister_on_shutdown,
            log_control: None,
        }
    }

    /// Route `on_change_logger_level` to `control`.
    #[must_use]
    pub fn with_log_control(mut self, control: Box<dyn LogLevelControl>) -> Self {
        self.log_control = Some(control);
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator<T, H> {
        &self.orchestrator
    }

    /// Wait for the host, reset its selection list and discover devices.
    ///
    /// A failed discovery is logged, not returned: the bridge stays up with
    /// whatever it managed to register.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Host`] when the host never becomes ready or
    /// refuses to clear its selection list.
    pub async fn on_start(&self, reason: Option<&str>) -> Result<(), BridgeError> {
        tracing::info!(reason = reason.unwrap_or("none"), "starting SwitchBot bridge");

        self.host.ready().await?;
        self.host.clear_select().await?;

        if self.orchestrator.allow_list().is_empty() {
            tracing::warn!("no device addresses configured, nothing will be bridged");
        }

        if let Err(err) = self.orchestrator.discover().await {
            tracing::error!(error = %err, "failed to start BLE scanning");
        }
        Ok(())
    }

    /// Send a command to a bridged device.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::command`].
    pub async fn command(
        &self,
        address: &DeviceAddress,
        command: CoverCommand,
    ) -> Result<(), BridgeError> {
        self.orchestrator.command(address, command).await
    }

    /// Change the log level at runtime.
    pub fn on_change_logger_level(&self, level: tracing::Level) {
        match &self.log_control {
            Some(control) => match control.set_level(level) {
                Ok(()) => tracing::info!(%level, "log level changed"),
                Err(err) => tracing::warn!(%level, error = %err, "failed to change log level"),
            },
            None => tracing::debug!(%level, "no log level control installed, ignoring"),
        }
    }

    /// Destroy every device, then unregister them from the host if
    /// configured to.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Host`] when unregistration fails.
    pub async fn on_shutdown(&self, reason: Option<&str>) -> Result<(), BridgeError> {
        tracing::info!(reason = reason.unwrap_or("none"), "shutting down SwitchBot bridge");

        self.orchestrator.shutdown().await;
        if self.unregister_on_shutdown {
            self.host.unregister_all_devices().await?;
            tracing::info!("all devices unregistered");
        }
        Ok(())
    }
}
