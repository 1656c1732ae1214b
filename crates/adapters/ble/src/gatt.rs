//! GATT command writer for SwitchBot devices.
//!
//! Every command is a single write to the SwitchBot command
//! characteristic. [`send_command`] connects, writes and always
//! disconnects, even on error.

use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;

use crate::error::BleError;

/// SwitchBot GATT service.
pub const SERVICE_UUID: uuid::Uuid =
    uuid::Uuid::from_u128(0xcba2_0d00_224d_11e6_9fb8_0002_a5d5_c51b);

/// Command characteristic (write with response).
pub const WRITE_CHAR: uuid::Uuid = uuid::Uuid::from_u128(0xcba2_0002_224d_11e6_9fb8_0002_a5d5_c51b);

/// Header shared by every curtain command.
const CURTAIN_HEADER: [u8; 4] = [0x57, 0x0F, 0x45, 0x01];
const MODE_MOVE: [u8; 2] = [0x05, 0xFF];
const MODE_PAUSE: [u8; 2] = [0x00, 0xFF];
const MAX_POSITION: u8 = 100;

/// A curtain motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurtainCommand {
    Open,
    Close,
    Pause,
    /// Move to a position, percent closed.
    RunToPos(u8),
}

impl CurtainCommand {
    /// Bytes written to [`WRITE_CHAR`].
    #[must_use]
    pub fn payload(self) -> Vec<u8> {
        let mut payload = CURTAIN_HEADER.to_vec();
        match self {
            Self::Open => {
                payload.extend_from_slice(&MODE_MOVE);
                payload.push(0);
            }
            Self::Close => {
                payload.extend_from_slice(&MODE_MOVE);
                payload.push(MAX_POSITION);
            }
            Self::Pause => payload.extend_from_slice(&MODE_PAUSE),
            Self::RunToPos(position) => {
                payload.extend_from_slice(&MODE_MOVE);
                payload.push(position.min(MAX_POSITION));
            }
        }
        payload
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Pause => "pause",
            Self::RunToPos(_) => "run_to_pos",
        }
    }
}

fn find_characteristic(
    peripheral: &Peripheral,
    uuid: uuid::Uuid,
) -> Result<Characteristic, BleError> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid && c.service_uuid == SERVICE_UUID)
        .ok_or(BleError::CharacteristicNotFound { uuid })
}

/// Connect to a SwitchBot peripheral and write one command.
///
/// The connection is always closed on return, even if the write fails. The
/// caller is responsible for applying a timeout around this function.
///
/// # Errors
///
/// Returns [`BleError::GattConnect`] if the connection fails,
/// [`BleError::CharacteristicNotFound`] if the command characteristic is
/// missing, or [`BleError::Scan`] for discovery/write failures.
pub async fn send_command(peripheral: &Peripheral, command: CurtainCommand) -> Result<(), BleError> {
    peripheral.connect().await.map_err(BleError::GattConnect)?;

    let result = send_command_inner(peripheral, command).await;

    if let Err(err) = peripheral.disconnect().await {
        tracing::warn!(%err, "failed to disconnect SwitchBot peripheral");
    }

    result
}

async fn send_command_inner(peripheral: &Peripheral, command: CurtainCommand) -> Result<(), BleError> {
    peripheral.discover_services().await?;

    let write_char = find_characteristic(peripheral, WRITE_CHAR)?;
    peripheral
        .write(&write_char, &command.payload(), WriteType::WithResponse)
        .await?;

    tracing::debug!(command = command.name(), "SwitchBot command written");
    Ok(())
}
