//! BLE adapter error types.

use switchbridge_domain::error::TransportError;

/// Errors specific to the BLE adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// BLE scan or adapter operation failed.
    #[error("BLE scan error")]
    Scan(#[from] btleplug::Error),

    /// Could not open a GATT connection to the peripheral.
    #[error("failed to connect to peripheral")]
    GattConnect(#[source] btleplug::Error),

    /// The peripheral does not expose the expected characteristic.
    #[error("characteristic {uuid} not found")]
    CharacteristicNotFound {
        /// UUID that was looked up.
        uuid: uuid::Uuid,
    },

    /// An operation did not complete in time.
    #[error("BLE {operation} timed out")]
    Timeout {
        /// Short name of the operation.
        operation: &'static str,
    },

    /// Failed to parse a BLE advertisement payload.
    #[error("failed to parse BLE payload")]
    PayloadParse(#[source] PayloadParseError),
}

/// Details about why a BLE advertisement payload could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum PayloadParseError {
    /// The service UUID is not one SwitchBot devices advertise under.
    #[error("unsupported service UUID {0}")]
    UnsupportedUuid(uuid::Uuid),

    /// The payload has no model byte.
    #[error("empty service data payload")]
    Empty,
}

impl BleError {
    /// Convert into a [`TransportError`] for propagation across the port
    /// boundary.
    #[must_use]
    pub fn into_transport(self) -> TransportError {
        match self {
            Self::NotAvailable => TransportError::NotAvailable,
            Self::Timeout { operation } => TransportError::Timeout { operation },
            other => TransportError::Backend(Box::new(other)),
        }
    }
}

impl From<BleError> for TransportError {
    fn from(err: BleError) -> Self {
        err.into_transport()
    }
}
