//! In-memory port implementations for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use switchbridge_domain::advertisement::AdvertisementEvent;
use switchbridge_domain::endpoint::{AttributeUpdate, EndpointDescriptor};
use switchbridge_domain::error::{HostError, TransportError};
use switchbridge_domain::model::ModelCode;

use crate::ports::{
    AdvertisementCallback, BlePeripheral, BleTransport, DiscoverOptions, HostInfo, HostPlatform,
    ScanControl, SelectKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralCall {
    Open,
    Close,
    Pause,
    RunToPos(u8),
}

/// Peripheral recording every command it receives. Clones share the log.
#[derive(Clone)]
pub struct FakePeripheral {
    address: String,
    model: ModelCode,
    fail: bool,
    calls: Arc<Mutex<Vec<PeripheralCall>>>,
}

impl FakePeripheral {
    pub fn new(address: &str, model: ModelCode) -> Self {
        Self {
            address: address.to_string(),
            model,
            fail: false,
            calls: Arc::default(),
        }
    }

    pub fn curtain(address: &str) -> Self {
        Self::new(address, ModelCode::CURTAIN)
    }

    /// Every command fails with [`TransportError::NotAvailable`].
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<PeripheralCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PeripheralCall) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(TransportError::NotAvailable)
        } else {
            Ok(())
        }
    }
}

impl BlePeripheral for FakePeripheral {
    fn address(&self) -> &str {
        &self.address
    }

    fn model(&self) -> ModelCode {
        self.model
    }

    async fn open(&self) -> Result<(), TransportError> {
        self.record(PeripheralCall::Open)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.record(PeripheralCall::Close)
    }

    async fn pause(&self) -> Result<(), TransportError> {
        self.record(PeripheralCall::Pause)
    }

    async fn run_to_pos(&self, percent: u8) -> Result<(), TransportError> {
        self.record(PeripheralCall::RunToPos(percent))
    }
}

/// Scan control counting restart requests.
#[derive(Clone, Default)]
pub struct CountingScan {
    restarts: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingScan {
    pub fn failing() -> Self {
        Self {
            restarts: Arc::default(),
            fail: true,
        }
    }

    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

impl ScanControl for CountingScan {
    async fn restart_scan(&self) -> Result<(), TransportError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(TransportError::Timeout { operation: "scan" })
        } else {
            Ok(())
        }
    }
}

/// Transport returning a fixed discovery result.
pub struct FakeTransport {
    peripherals: Vec<FakePeripheral>,
    fail_discovery: bool,
    fail_scan: bool,
    scanning: AtomicBool,
    scan_starts: AtomicUsize,
    scan_stops: AtomicUsize,
    callback: Mutex<Option<AdvertisementCallback>>,
}

impl FakeTransport {
    pub fn new(peripherals: Vec<FakePeripheral>) -> Self {
        Self {
            peripherals,
            fail_discovery: false,
            fail_scan: false,
            scanning: AtomicBool::new(false),
            scan_starts: AtomicUsize::new(0),
            scan_stops: AtomicUsize::new(0),
            callback: Mutex::new(None),
        }
    }

    pub fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub fn failing_scan(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    pub fn scan_starts(&self) -> usize {
        self.scan_starts.load(Ordering::SeqCst)
    }

    pub fn scan_stops(&self) -> usize {
        self.scan_stops.load(Ordering::SeqCst)
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    /// Deliver an advertisement as the continuous scan would.
    pub fn emit(&self, event: AdvertisementEvent) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

impl BleTransport for FakeTransport {
    type Peripheral = FakePeripheral;

    async fn discover(
        &self,
        _options: DiscoverOptions,
    ) -> Result<Vec<FakePeripheral>, TransportError> {
        if self.fail_discovery {
            return Err(TransportError::NotAvailable);
        }
        Ok(self.peripherals.clone())
    }

    fn set_advertisement_callback(&self, callback: AdvertisementCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }

    async fn start_scan(&self) -> Result<(), TransportError> {
        self.scan_starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan {
            return Err(TransportError::NotAvailable);
        }
        self.scanning.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_scan(&self) -> Result<(), TransportError> {
        self.scan_stops.fetch_add(1, Ordering::SeqCst);
        self.scanning.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Everything a [`RecordingHost`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct HostLog {
    pub ready: usize,
    pub cleared: usize,
    /// `(serial, name, kind)`
    pub selected: Vec<(String, String, &'static str)>,
    pub registered: Vec<String>,
    pub unregistered_all: usize,
    /// `(endpoint id, update)`, in completion order.
    pub updates: Vec<(String, AttributeUpdate)>,
}

/// Host recording every call. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingHost {
    log: Arc<Mutex<HostLog>>,
    reject_names: Arc<Vec<String>>,
    fail_updates: bool,
    yielding: bool,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingHost {
    /// Host whose validation refuses `name`.
    pub fn rejecting(name: &str) -> Self {
        Self {
            reject_names: Arc::new(vec![name.to_string()]),
            ..Self::default()
        }
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Yield to the scheduler before recording each update, so concurrent
    /// callers get a chance to interleave.
    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    /// Hold every update until [`open_gate`](Self::open_gate).
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn log(&self) -> HostLog {
        self.log.lock().unwrap().clone()
    }

    pub fn updates_for(&self, endpoint_id: &str) -> Vec<AttributeUpdate> {
        self.log
            .lock()
            .unwrap()
            .updates
            .iter()
            .filter(|(id, _)| id == endpoint_id)
            .map(|(_, update)| *update)
            .collect()
    }
}

impl HostPlatform for RecordingHost {
    async fn ready(&self) -> Result<(), HostError> {
        self.log.lock().unwrap().ready += 1;
        Ok(())
    }

    fn info(&self) -> HostInfo {
        HostInfo {
            vendor_id: 0xFFF1,
            vendor_name: "Test Vendor".to_string(),
            plugin_version: "1.0".to_string(),
            host_version: "3.3.0".to_string(),
        }
    }

    async fn clear_select(&self) -> Result<(), HostError> {
        self.log.lock().unwrap().cleared += 1;
        Ok(())
    }

    async fn set_select_device(
        &self,
        serial: &str,
        name: &str,
        _icon: Option<&str>,
        kind: SelectKind,
    ) -> Result<(), HostError> {
        self.log
            .lock()
            .unwrap()
            .selected
            .push((serial.to_string(), name.to_string(), kind.as_str()));
        Ok(())
    }

    fn validate_device(&self, name: &str) -> bool {
        !self.reject_names.iter().any(|rejected| rejected == name)
    }

    async fn register_device(&self, endpoint: &EndpointDescriptor) -> Result<(), HostError> {
        self.log.lock().unwrap().registered.push(endpoint.id.clone());
        Ok(())
    }

    async fn unregister_all_devices(&self) -> Result<(), HostError> {
        let mut log = self.log.lock().unwrap();
        log.unregistered_all += 1;
        log.registered.clear();
        Ok(())
    }

    async fn update_attribute(
        &self,
        endpoint_id: &str,
        update: AttributeUpdate,
    ) -> Result<(), HostError> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        if self.yielding {
            tokio::task::yield_now().await;
        }
        if self.fail_updates {
            return Err(HostError::NotReady);
        }
        self.log
            .lock()
            .unwrap()
            .updates
            .push((endpoint_id.to_string(), update));
        Ok(())
    }
}
