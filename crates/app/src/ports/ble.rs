//! BLE transport port — discovery, continuous scanning and peripheral
//! commands.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use switchbridge_domain::advertisement::AdvertisementEvent;
use switchbridge_domain::error::TransportError;
use switchbridge_domain::model::ModelCode;

/// Receives every advertisement delivered by the continuous scan.
///
/// Called synchronously from the transport's listener, so it must return
/// quickly.
pub type AdvertisementCallback = Arc<dyn Fn(AdvertisementEvent) + Send + Sync>;

/// Options for a bounded discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// How long to listen before returning what was seen.
    pub timeout: Duration,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// A peripheral seen during discovery, able to receive cover commands.
pub trait BlePeripheral: Send + Sync + 'static {
    /// Address as reported by the radio (any case).
    fn address(&self) -> &str;

    /// Model code from the peripheral's advertisement.
    fn model(&self) -> ModelCode;

    /// Fully open.
    fn open(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Fully close.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Stop any motion.
    fn pause(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Move to `percent` on the device's own scale.
    fn run_to_pos(&self, percent: u8) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// The BLE stack, as seen by the bridge.
pub trait BleTransport: Send + Sync + 'static {
    /// Peripheral handle produced by [`discover`](Self::discover).
    type Peripheral: BlePeripheral;

    /// Run one bounded discovery pass and return every peripheral seen.
    fn discover(
        &self,
        options: DiscoverOptions,
    ) -> impl Future<Output = Result<Vec<Self::Peripheral>, TransportError>> + Send;

    /// Install the callback that receives continuous-scan advertisements,
    /// replacing any previous one.
    fn set_advertisement_callback(&self, callback: AdvertisementCallback);

    /// Start continuous scanning. Calling it while a scan is running is a
    /// no-op; calling it after the stack silently stopped the scan restarts it.
    fn start_scan(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Stop continuous scanning.
    fn stop_scan(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Lets a device ask for the continuous scan to be re-armed.
///
/// Opening a GATT connection stops scanning on many BLE stacks, so devices
/// call this after every command.
pub trait ScanControl: Clone + Send + Sync + 'static {
    /// Request a scan restart.
    fn restart_scan(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
