//! Curtain translator — maps window-covering commands onto the curtain
//! motor and curtain advertisements onto window-covering and power-source
//! attributes.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use switchbridge_domain::address::DeviceAddress;
use switchbridge_domain::advertisement::ServiceData;
use switchbridge_domain::battery::{BatteryReading, ChargeLevel};
use switchbridge_domain::command::CoverCommand;
use switchbridge_domain::cover::LiftPercent100ths;
use switchbridge_domain::endpoint::{
    AttributeUpdate, BasicInformation, ClusterServer, DeviceIdentity, DeviceType,
    EndProductType, EndpointDescriptor, WindowCoveringType, version_label, version_number,
};
use switchbridge_domain::error::{BridgeError, HostError};

use crate::ports::{BlePeripheral, HostInfo, HostPlatform, ScanControl, SelectKind};

use super::TranslatorState;

const ID_PREFIX: &str = "switchbot-curtain";
const PRODUCT_NAME: &str = "SwitchBot Curtain Device";
const MAIN_SUFFIX: &str = "main";

/// Battery value declared before the first advertisement arrives.
const INITIAL_BATTERY_PERCENT: u8 = 100;

/// The endpoint once created, plus the host handle used to publish on it.
struct Endpoint<H> {
    host: H,
    identity: DeviceIdentity,
    main_id: String,
    descriptor: EndpointDescriptor,
}

impl<H: HostPlatform> Endpoint<H> {
    async fn publish(&self, update: AttributeUpdate) -> Result<(), HostError> {
        self.host.update_attribute(&self.main_id, update).await
    }
}

/// A SwitchBot Curtain bridged as a Matter window covering.
pub struct CurtainTranslator<P, S, H> {
    address: DeviceAddress,
    name: String,
    peripheral: P,
    scan: S,
    endpoint: OnceLock<Endpoint<H>>,
    refresh_lock: Mutex<()>,
    lock_timeout: Duration,
    registered: AtomicBool,
    destroyed: AtomicBool,
}

impl<P, S, H> CurtainTranslator<P, S, H>
where
    P: BlePeripheral,
    S: ScanControl,
    H: HostPlatform,
{
    /// Wrap a discovered curtain peripheral.
    pub fn new(peripheral: P, scan: S, lock_timeout: Duration) -> Self {
        let address = DeviceAddress::new(peripheral.address());
        let name = format!("Curtain {address}");
        Self {
            address,
            name,
            peripheral,
            scan,
            endpoint: OnceLock::new(),
            refresh_lock: Mutex::new(()),
            lock_timeout,
            registered: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity, once the endpoint exists.
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.endpoint.get().map(|endpoint| &endpoint.identity)
    }

    /// Declared endpoint, once created.
    pub fn descriptor(&self) -> Option<&EndpointDescriptor> {
        self.endpoint.get().map(|endpoint| &endpoint.descriptor)
    }

    pub fn state(&self) -> TranslatorState {
        if self.destroyed.load(Ordering::Acquire) {
            TranslatorState::Destroyed
        } else if self.registered.load(Ordering::Acquire) {
            TranslatorState::Registered
        } else if self.endpoint.get().is_some() {
            TranslatorState::EndpointReady
        } else {
            TranslatorState::Created
        }
    }

    /// Build the endpoint tree and bind it to `host`.
    ///
    /// Only the first call has an effect.
    pub fn create_endpoint(&self, host: &H) {
        let identity = DeviceIdentity::derive(ID_PREFIX, &self.name);
        let main_id = format!("{}-{MAIN_SUFFIX}", identity.id);
        let descriptor = build_descriptor(&identity, &main_id, &host.info());

        let created = self.endpoint.set(Endpoint {
            host: host.clone(),
            identity,
            main_id,
            descriptor,
        });
        if created.is_err() {
            tracing::warn!(address = %self.address, "endpoint already created, ignoring");
        }
    }

    /// Announce the device to the host's selection list, then register it
    /// if the host's validation accepts its name.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EndpointNotReady`] before
    /// [`create_endpoint`](Self::create_endpoint), or [`BridgeError::Host`]
    /// when the host rejects an operation.
    pub async fn register_with_platform(&self, host: &H) -> Result<(), BridgeError> {
        let endpoint = self.endpoint()?;
        let identity = &endpoint.identity;

        host.set_select_device(&identity.serial, &identity.name, None, SelectKind::Hub)
            .await?;

        if !host.validate_device(&identity.name) {
            tracing::info!(address = %self.address, name = %identity.name, "device not accepted by host, skipping registration");
            return Ok(());
        }

        host.register_device(&endpoint.descriptor).await?;
        self.registered.store(true, Ordering::Release);
        tracing::info!(address = %self.address, serial = %identity.serial, "device registered");
        Ok(())
    }

    /// Send a command to the curtain, then re-arm the scan.
    ///
    /// The scan restart happens whatever the command outcome, and its own
    /// failure is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::CommandFailed`] when the BLE call fails and
    /// [`BridgeError::Destroyed`] after [`destroy`](Self::destroy).
    #[tracing::instrument(skip(self), fields(address = %self.address))]
    pub async fn apply_command(&self, command: CoverCommand) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            return Err(BridgeError::Destroyed {
                address: self.address.clone(),
            });
        }

        tracing::debug!(%command, "sending command");
        let result = match command {
            CoverCommand::Open => self.peripheral.open().await,
            CoverCommand::Close => self.peripheral.close().await,
            CoverCommand::Stop => self.peripheral.pause().await,
            CoverCommand::GoToLiftPercent(lift) => {
                self.peripheral.run_to_pos(lift.to_raw_position()).await
            }
        };

        // connecting to the peripheral stops the scan, whatever the outcome
        if let Err(err) = self.scan.restart_scan().await {
            tracing::warn!(%err, "failed to restart BLE scan after command");
        }

        result.map_err(|source| BridgeError::CommandFailed {
            address: self.address.clone(),
            command,
            source,
        })
    }

    /// Handle an `identify` request. Curtains have no indicator, so this only
    /// logs.
    pub fn identify(&self, identify_time: u16) {
        tracing::debug!(address = %self.address, identify_time, "identify requested");
    }

    /// Publish the state carried by one advertisement.
    ///
    /// Updates for the same device are applied one at a time, in arrival
    /// order. Position and battery are published concurrently inside the
    /// critical section, and every write finishes before the lock is
    /// released.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::LockTimeout`] when the lock is not acquired
    /// within the configured timeout (nothing is published),
    /// [`BridgeError::EndpointNotReady`] before the endpoint exists, and
    /// [`BridgeError::Host`] when any write fails.
    pub async fn handle_advertisement(&self, data: &ServiceData) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            tracing::trace!(address = %self.address, "advertisement for destroyed device ignored");
            return Ok(());
        }
        let endpoint = self.endpoint()?;

        let _guard = tokio::time::timeout(self.lock_timeout, self.refresh_lock.lock())
            .await
            .map_err(|_| BridgeError::LockTimeout {
                address: self.address.clone(),
                timeout: self.lock_timeout,
            })?;

        let position = async {
            match data.position {
                Some(raw) => {
                    let lift = LiftPercent100ths::from_raw_position(raw);
                    endpoint
                        .publish(AttributeUpdate::CurrentPositionLiftPercent100ths(lift))
                        .await
                }
                None => Ok(()),
            }
        };

        let battery = async {
            match data.battery {
                Some(raw) => {
                    let reading = BatteryReading::from_raw(raw);
                    let (percent, level) = tokio::join!(
                        endpoint.publish(AttributeUpdate::BatPercentRemaining(reading.percent())),
                        endpoint.publish(AttributeUpdate::BatChargeLevel(reading.charge_level())),
                    );
                    percent.and(level)
                }
                None => Ok(()),
            }
        };

        let (position, battery) = tokio::join!(position, battery);
        position.and(battery)?;
        Ok(())
    }

    /// Stop accepting updates and commands. Idempotent.
    pub fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            tracing::debug!(address = %self.address, "device destroyed");
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn endpoint(&self) -> Result<&Endpoint<H>, BridgeError> {
        self.endpoint.get().ok_or_else(|| BridgeError::EndpointNotReady {
            address: self.address.clone(),
        })
    }
}

/// Bridged-node root carrying basic information, with one window-covering
/// child powered by a battery.
fn build_descriptor(identity: &DeviceIdentity, main_id: &str, info: &HostInfo) -> EndpointDescriptor {
    let basic_information = BasicInformation {
        device_name: identity.name.clone(),
        serial_number: identity.serial.clone(),
        vendor_id: info.vendor_id,
        vendor_name: info.vendor_name.clone(),
        product_name: PRODUCT_NAME.to_string(),
        software_version: version_number(&info.plugin_version),
        software_version_string: version_label(&info.plugin_version),
        hardware_version: version_number(&info.host_version),
        hardware_version_string: info.host_version.clone(),
    };

    let main = EndpointDescriptor {
        id: main_id.to_string(),
        device_types: vec![DeviceType::WindowCovering],
        clusters: vec![
            ClusterServer::Identify,
            ClusterServer::Groups,
            ClusterServer::WindowCovering {
                covering_type: WindowCoveringType::Drapery,
                end_product_type: EndProductType::LateralLeftCurtain,
            },
            ClusterServer::PowerSourceBattery {
                bat_percent_remaining: INITIAL_BATTERY_PERCENT,
                charge_level: ChargeLevel::Ok,
            },
        ],
        children: Vec::new(),
    };

    EndpointDescriptor {
        id: identity.id.clone(),
        device_types: vec![DeviceType::BridgedNode],
        clusters: vec![
            ClusterServer::Identify,
            ClusterServer::BridgedDeviceBasicInformation(basic_information),
        ],
        children: vec![main],
    }
}
