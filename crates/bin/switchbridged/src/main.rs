//! # switchbridged — composition root
//!
//! Wires the SwitchBot BLE transport and the in-process host to the bridge
//! core, then runs the platform lifecycle:
//!
//! 1. Load configuration (`switchbridge.toml` + env overrides)
//! 2. Install the tracing subscriber
//! 3. Validate bridge settings (a bad allow-list stops here)
//! 4. `on_start`, then wait for a shutdown signal
//! 5. `on_shutdown`
//!
//! On unix, `SIGUSR1` switches logging to debug and `SIGUSR2` back to info.

mod config;
mod logging;

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use switchbridge_adapter_ble::SwitchBotTransport;
use switchbridge_adapter_virtual::{AttributeChange, VirtualHost};
use switchbridge_app::platform::SwitchBotPlatform;
use switchbridge_app::ports::{BleTransport, HostPlatform};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let log_control = logging::init(config.log_filter());

    let settings = config.bridge_settings()?;
    tracing::info!(
        devices = settings.allow_list().len(),
        unregister_on_shutdown = settings.unregister_on_shutdown(),
        "configuration loaded"
    );

    let transport = Arc::new(SwitchBotTransport::new(config.ble.clone()));
    let host = VirtualHost::new(config.host_config());
    let watcher = tokio::spawn(log_attribute_changes(host.subscribe()));

    let platform = SwitchBotPlatform::new(transport, host, settings)
        .with_log_control(Box::new(log_control));

    platform.on_start(Some("startup")).await?;
    let reason = wait_for_shutdown(&platform).await?;
    platform.on_shutdown(Some(reason)).await?;

    watcher.abort();
    Ok(())
}

/// Log every attribute the bridge publishes.
async fn log_attribute_changes(mut changes: broadcast::Receiver<AttributeChange>) {
    loop {
        match changes.recv().await {
            Ok(change) => tracing::info!(
                endpoint = %change.endpoint_id,
                attribute = change.update.attribute_name(),
                value = ?change.update,
                "attribute published"
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "attribute log lagging behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown<T, H>(
    platform: &SwitchBotPlatform<T, H>,
) -> std::io::Result<&'static str>
where
    T: BleTransport,
    H: HostPlatform,
{
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut verbose = signal(SignalKind::user_defined1())?;
    let mut quiet = signal(SignalKind::user_defined2())?;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                return Ok("interrupt");
            }
            _ = terminate.recv() => return Ok("terminate"),
            _ = verbose.recv() => platform.on_change_logger_level(tracing::Level::DEBUG),
            _ = quiet.recv() => platform.on_change_logger_level(tracing::Level::INFO),
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown<T, H>(
    _platform: &SwitchBotPlatform<T, H>,
) -> std::io::Result<&'static str>
where
    T: BleTransport,
    H: HostPlatform,
{
    tokio::signal::ctrl_c().await?;
    Ok("interrupt")
}
