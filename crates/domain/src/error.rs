//! Error types shared across the workspace.
//!
//! [`BridgeError`] is the cross-layer error of the bridge core. The two
//! boundary errors, [`TransportError`] (BLE side) and [`HostError`] (host
//! platform side), are what port implementations return; adapters convert
//! their own typed errors into them.

use std::time::Duration;

use crate::address::DeviceAddress;
use crate::command::CoverCommand;
use crate::model::ModelCode;

/// Type-erased error carried across a port boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Validation failures for domain value objects.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A device address was empty (or whitespace only).
    #[error("device address must not be empty")]
    EmptyAddress,

    /// A device address contained a character that is neither a hex digit
    /// nor a separator.
    #[error("invalid character {character:?} in device address {address:?}")]
    InvalidAddressCharacter {
        /// The offending address, as supplied.
        address: String,
        /// The first rejected character.
        character: char,
    },

    /// A lift percentage outside `0..=10000`.
    #[error("lift percent {0} is out of range (0..=10000)")]
    LiftPercentOutOfRange(u16),
}

/// Errors reported by the BLE transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No BLE adapter is available on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// A BLE operation did not complete in time.
    #[error("BLE {operation} timed out")]
    Timeout {
        /// Short name of the operation (`"discover"`, `"command"`, ...).
        operation: &'static str,
    },

    /// Any other failure raised by the BLE backend.
    #[error("BLE backend error")]
    Backend(#[source] BoxError),
}

/// Errors reported by the host platform boundary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host has not signalled readiness.
    #[error("host platform is not ready")]
    NotReady,

    /// An endpoint with this id is already registered.
    #[error("endpoint {0} is already registered")]
    DuplicateEndpoint(String),

    /// No registered endpoint has this id.
    #[error("unknown endpoint {0}")]
    UnknownEndpoint(String),

    /// Any other failure raised by the host.
    #[error("host platform error")]
    Backend(#[source] BoxError),
}

/// Errors raised by the bridge core.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The factory does not know the model code a peripheral reported.
    #[error("unsupported device type {model} reported by {address}")]
    UnsupportedDeviceType {
        /// Address of the peripheral.
        address: DeviceAddress,
        /// The unknown model code.
        model: ModelCode,
    },

    /// A BLE command sent to a peripheral failed.
    #[error("command {command} failed on {address}")]
    CommandFailed {
        /// Address of the peripheral.
        address: DeviceAddress,
        /// The command that was attempted.
        command: CoverCommand,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The per-device update lock could not be acquired in time.
    #[error("timed out after {}ms waiting for the update lock of {address}", timeout.as_millis())]
    LockTimeout {
        /// Address of the device whose lock was contended.
        address: DeviceAddress,
        /// How long the caller waited.
        timeout: Duration,
    },

    /// The discovery scan itself failed.
    #[error("BLE discovery failed")]
    DiscoveryTransport(#[source] TransportError),

    /// Continuous scanning could not be (re)started.
    #[error("failed to start BLE scanning")]
    ScanStart(#[source] TransportError),

    /// The bridge configuration is invalid.
    #[error("invalid configuration")]
    ConfigInvalid(#[from] ValidationError),

    /// An operation needed the device endpoint before it was created.
    #[error("endpoint for {address} has not been created")]
    EndpointNotReady {
        /// Address of the device.
        address: DeviceAddress,
    },

    /// The device has been destroyed and no longer accepts commands.
    #[error("device {address} has been destroyed")]
    Destroyed {
        /// Address of the device.
        address: DeviceAddress,
    },

    /// No device with this address is registered.
    #[error("no registered device with address {address}")]
    UnknownDevice {
        /// The requested address.
        address: DeviceAddress,
    },

    /// The host platform rejected an operation.
    #[error("host platform error")]
    Host(#[from] HostError),
}
