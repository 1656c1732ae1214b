//! Scan/discovery orchestrator.
//!
//! Owns the BLE scanning lifecycle: one bounded discovery pass that builds
//! and registers a translator per allow-listed peripheral, then continuous
//! scanning with the advertisement router installed as the callback.

use std::sync::Arc;
use std::time::Duration;

use switchbridge_domain::address::{AllowList, DeviceAddress};
use switchbridge_domain::command::CoverCommand;
use switchbridge_domain::error::{BridgeError, TransportError};

use crate::devices::Translator;
use crate::factory;
use crate::ports::{BlePeripheral, BleTransport, DiscoverOptions, HostPlatform, ScanControl};
use crate::registry::DeviceRegistry;
use crate::router::AdvertisementRouter;

/// [`ScanControl`] handed to every translator: restarting the scan is a
/// plain `start_scan` on the shared transport.
pub struct ScanHandle<T> {
    transport: Arc<T>,
}

impl<T> ScanHandle<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T> Clone for ScanHandle<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: BleTransport> ScanControl for ScanHandle<T> {
    async fn restart_scan(&self) -> Result<(), TransportError> {
        self.transport.start_scan().await
    }
}

/// Translator type built by an orchestrator over transport `T` and host `H`.
pub type Device<T, H> = Translator<<T as BleTransport>::Peripheral, ScanHandle<T>, H>;

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Devices created and registered with the registry.
    pub added: Vec<DeviceAddress>,
    /// Peripherals ignored because they are not allow-listed.
    pub skipped: Vec<DeviceAddress>,
    /// Allow-listed peripherals whose setup failed.
    pub failed: Vec<DeviceAddress>,
}

pub struct Orchestrator<T: BleTransport, H> {
    transport: Arc<T>,
    host: H,
    allow_list: AllowList,
    discover_options: DiscoverOptions,
    lock_timeout: Duration,
    registry: Arc<DeviceRegistry<Device<T, H>>>,
}

impl<T, H> Orchestrator<T, H>
where
    T: BleTransport,
    H: HostPlatform,
{
    pub fn new(
        transport: Arc<T>,
        host: H,
        allow_list: AllowList,
        discover_options: DiscoverOptions,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            host,
            allow_list,
            discover_options,
            lock_timeout,
            registry: Arc::new(DeviceRegistry::new()),
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Devices discovered so far.
    pub fn registry(&self) -> &Arc<DeviceRegistry<Device<T, H>>> {
        &self.registry
    }

    /// Run one discovery pass, then start continuous scanning.
    ///
    /// Each allow-listed peripheral is set up independently: a failure is
    /// logged and recorded in the report, and discovery moves on.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::DiscoveryTransport`] when the discovery scan
    /// itself fails, and [`BridgeError::ScanStart`] when continuous scanning
    /// cannot be started afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn discover(&self) -> Result<DiscoveryReport, BridgeError> {
        let peripherals = self
            .transport
            .discover(self.discover_options)
            .await
            .map_err(BridgeError::DiscoveryTransport)?;
        tracing::debug!(count = peripherals.len(), "discovery pass finished");

        let mut report = DiscoveryReport::default();
        for peripheral in peripherals {
            let address = DeviceAddress::new(peripheral.address());
            if !self.allow_list.contains(&address) {
                tracing::info!(%address, "device not in allow-list, skipping");
                report.skipped.push(address);
                continue;
            }
            if self.registry.contains(&address) {
                tracing::debug!(%address, "device already discovered");
                continue;
            }

            match self.add_device(peripheral).await {
                Ok(()) => report.added.push(address),
                Err(err) => {
                    tracing::error!(%address, error = %err, "failed to set up device");
                    report.failed.push(address);
                }
            }
        }

        let router = AdvertisementRouter::new(Arc::clone(&self.registry));
        self.transport
            .set_advertisement_callback(router.into_callback());
        self.start_scan().await?;

        tracing::info!(
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "discovery complete, listening for advertisements"
        );
        Ok(report)
    }

    /// (Re)start continuous scanning. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ScanStart`] when the transport refuses.
    pub async fn start_scan(&self) -> Result<(), BridgeError> {
        self.transport
            .start_scan()
            .await
            .map_err(BridgeError::ScanStart)
    }

    /// Send a command to a discovered device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownDevice`] for an address that was never
    /// discovered, or the translator's own error.
    pub async fn command(
        &self,
        address: &DeviceAddress,
        command: CoverCommand,
    ) -> Result<(), BridgeError> {
        self.device(address)?.apply_command(command).await
    }

    /// Forward an identify request to a discovered device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownDevice`] for an address that was never
    /// discovered.
    pub fn identify(&self, address: &DeviceAddress, identify_time: u16) -> Result<(), BridgeError> {
        self.device(address)?.identify(identify_time);
        Ok(())
    }

    /// Destroy every device and stop scanning.
    pub async fn shutdown(&self) {
        let devices = self.registry.all();
        for device in &devices {
            device.destroy();
        }
        if let Err(err) = self.transport.stop_scan().await {
            tracing::warn!(error = %err, "failed to stop BLE scan");
        }
        tracing::info!(count = devices.len(), "devices destroyed");
    }

    fn device(&self, address: &DeviceAddress) -> Result<Arc<Device<T, H>>, BridgeError> {
        self.registry
            .get(address)
            .ok_or_else(|| BridgeError::UnknownDevice {
                address: address.clone(),
            })
    }

    async fn add_device(&self, peripheral: T::Peripheral) -> Result<(), BridgeError> {
        let device: Device<T, H> = factory::create(
            peripheral,
            ScanHandle::new(Arc::clone(&self.transport)),
            self.lock_timeout,
        )?;
        device.create_endpoint(&self.host);

        let device = Arc::new(device);
        self.registry
            .insert(device.address().clone(), Arc::clone(&device));
        device.register_with_platform(&self.host).await
    }
}
