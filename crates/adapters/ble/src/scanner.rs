//! SwitchBot BLE transport — discovery pass, continuous scan and peripheral
//! handles.
//!
//! The host adapter is resolved lazily on first use, so a machine without
//! Bluetooth surfaces as a discovery failure rather than a startup crash.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt as _};

use switchbridge_app::ports::{AdvertisementCallback, BlePeripheral, BleTransport, DiscoverOptions};
use switchbridge_domain::error::TransportError;
use switchbridge_domain::model::ModelCode;

use crate::config::BleConfig;
use crate::error::BleError;
use crate::gatt::{self, CurtainCommand};
use crate::parser;

type CallbackSlot = Arc<RwLock<Option<AdvertisementCallback>>>;

/// [`BleTransport`] over the host's Bluetooth stack, via `btleplug`.
pub struct SwitchBotTransport {
    config: BleConfig,
    central: OnceCell<Adapter>,
    callback: CallbackSlot,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SwitchBotTransport {
    #[must_use]
    pub fn new(config: BleConfig) -> Self {
        Self {
            config,
            central: OnceCell::new(),
            callback: Arc::new(RwLock::new(None)),
            pump: Mutex::new(None),
        }
    }

    async fn central(&self) -> Result<&Adapter, BleError> {
        self.central
            .get_or_try_init(|| async {
                let manager = Manager::new().await?;
                let adapters = manager.adapters().await?;
                tracing::debug!(count = adapters.len(), index = self.config.adapter_index, "BLE adapters found");
                adapters
                    .into_iter()
                    .nth(self.config.adapter_index)
                    .ok_or(BleError::NotAvailable)
            })
            .await
    }

    /// Listen for `duration` and collect every peripheral that advertised
    /// SwitchBot service data.
    async fn discover_switchbots(&self, duration: Duration) -> Result<Vec<SwitchBotPeripheral>, BleError> {
        let central = self.central().await?;
        let mut events = central.events().await?;

        central.start_scan(ScanFilter::default()).await?;
        tracing::info!(duration_ms = duration.as_millis(), "BLE discovery started");

        let mut seen: HashMap<PeripheralId, ModelCode> = HashMap::new();
        let deadline = tokio::time::Instant::now() + duration;

        while tokio::time::Instant::now() < deadline {
            let remaining = deadline - tokio::time::Instant::now();
            match tokio::time::timeout(remaining, events.next()).await {
                Ok(Some(CentralEvent::ServiceDataAdvertisement { id, service_data })) => {
                    if let Some(advertisement) = parser::find_advertisement(&service_data) {
                        seen.entry(id).or_insert(advertisement.model);
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }

        central.stop_scan().await?;

        // peripherals the stack already knew about may not re-advertise in time
        for peripheral in central.peripherals().await? {
            if seen.contains_key(&peripheral.id()) {
                continue;
            }
            if let Ok(Some(properties)) = peripheral.properties().await
                && let Some(advertisement) = parser::find_advertisement(&properties.service_data)
            {
                seen.insert(peripheral.id(), advertisement.model);
            }
        }

        let mut found = Vec::with_capacity(seen.len());
        for (id, model) in seen {
            let peripheral = central.peripheral(&id).await?;
            let handle = SwitchBotPeripheral::new(peripheral, model, self.config.command_timeout());
            tracing::debug!(address = %handle.address, %model, "SwitchBot peripheral found");
            found.push(handle);
        }

        Ok(found)
    }

    async fn start_continuous_scan(&self) -> Result<(), BleError> {
        let central = self.central().await?;

        let needs_pump = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_none_or(JoinHandle::is_finished);
        if needs_pump {
            let events = central.events().await?;
            let handle = tokio::spawn(pump_advertisements(
                central.clone(),
                events,
                Arc::clone(&self.callback),
            ));
            let previous = self
                .pump
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .replace(handle);
            if let Some(previous) = previous {
                previous.abort();
            }
            tracing::debug!("BLE advertisement listener started");
        }

        central.start_scan(ScanFilter::default()).await?;
        Ok(())
    }

    async fn stop_continuous_scan(&self) -> Result<(), BleError> {
        self.abort_pump();
        if let Some(central) = self.central.get() {
            central.stop_scan().await?;
        }
        Ok(())
    }

    fn abort_pump(&self) {
        let handle = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("BLE advertisement listener aborted");
        }
    }
}

impl Drop for SwitchBotTransport {
    fn drop(&mut self) {
        self.abort_pump();
    }
}

impl BleTransport for SwitchBotTransport {
    type Peripheral = SwitchBotPeripheral;

    async fn discover(&self, options: DiscoverOptions) -> Result<Vec<SwitchBotPeripheral>, TransportError> {
        self.discover_switchbots(options.timeout)
            .await
            .map_err(BleError::into_transport)
    }

    fn set_advertisement_callback(&self, callback: AdvertisementCallback) {
        *self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    async fn start_scan(&self) -> Result<(), TransportError> {
        self.start_continuous_scan()
            .await
            .map_err(BleError::into_transport)
    }

    async fn stop_scan(&self) -> Result<(), TransportError> {
        self.stop_continuous_scan()
            .await
            .map_err(BleError::into_transport)
    }
}

/// Forward every SwitchBot advertisement carrying state to the installed
/// callback, until the event stream closes.
async fn pump_advertisements<S>(central: Adapter, mut events: S, callback: CallbackSlot)
where
    S: Stream<Item = CentralEvent> + Unpin + Send,
{
    while let Some(event) = events.next().await {
        let CentralEvent::ServiceDataAdvertisement { id, service_data } = event else {
            continue;
        };
        let Ok(peripheral) = central.peripheral(&id).await else {
            continue;
        };
        let address = peripheral.address().to_string();
        let Some(event) = parser::advertisement_event(&address, &service_data) else {
            continue;
        };

        let installed = callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match installed {
            Some(callback) => callback(event),
            None => tracing::trace!(%address, "advertisement received before callback installed"),
        }
    }
    tracing::debug!("BLE event stream closed");
}

/// A discovered SwitchBot device.
pub struct SwitchBotPeripheral {
    peripheral: Peripheral,
    address: String,
    model: ModelCode,
    command_timeout: Duration,
}

impl SwitchBotPeripheral {
    fn new(peripheral: Peripheral, model: ModelCode, command_timeout: Duration) -> Self {
        let address = peripheral.address().to_string();
        Self {
            peripheral,
            address,
            model,
            command_timeout,
        }
    }

    async fn execute(&self, command: CurtainCommand) -> Result<(), TransportError> {
        tracing::debug!(address = %self.address, command = command.name(), "sending SwitchBot command");
        match tokio::time::timeout(self.command_timeout, gatt::send_command(&self.peripheral, command))
            .await
        {
            Ok(result) => result.map_err(BleError::into_transport),
            Err(_) => Err(BleError::Timeout {
                operation: "command",
            }
            .into_transport()),
        }
    }
}

impl BlePeripheral for SwitchBotPeripheral {
    fn address(&self) -> &str {
        &self.address
    }

    fn model(&self) -> ModelCode {
        self.model
    }

    async fn open(&self) -> Result<(), TransportError> {
        self.execute(CurtainCommand::Open).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.execute(CurtainCommand::Close).await
    }

    async fn pause(&self) -> Result<(), TransportError> {
        self.execute(CurtainCommand::Pause).await
    }

    async fn run_to_pos(&self, percent: u8) -> Result<(), TransportError> {
        self.execute(CurtainCommand::RunToPos(percent)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use switchbridge_domain::advertisement::{AdvertisementEvent, ServiceData};

    #[tokio::test]
    async fn should_stop_scan_without_touching_adapter() {
        let transport = SwitchBotTransport::new(BleConfig::default());
        transport.stop_scan().await.unwrap();
        assert!(transport.central.get().is_none());
    }

    #[test]
    fn should_replace_advertisement_callback() {
        let transport = SwitchBotTransport::new(BleConfig::default());
        assert!(transport.callback.read().unwrap().is_none());

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        transport.set_advertisement_callback(Arc::new(move |event: AdvertisementEvent| {
            sink.lock().unwrap().push(event);
        }));

        let callback = transport.callback.read().unwrap().clone().unwrap();
        callback(AdvertisementEvent::new(
            "AA:BB:CC:DD:EE:FF",
            ServiceData {
                position: Some(1),
                battery: None,
            },
        ));
        assert_eq!(received.lock().unwrap().len(), 1);
    }
}
