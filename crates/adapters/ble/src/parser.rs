//! SwitchBot service-data parser.
//!
//! Pure functions operating on raw `&[u8]` slices — no BLE dependency needed.
//! SwitchBot devices advertise under two 16-bit service-data UUIDs, the
//! legacy `0x0D00` and the assigned `0xFD3D`, with the same layout:
//!
//! | Offset | Field | Mask |
//! |--------|-------|------|
//! | 0 | Model code (ASCII) | `0x7F` |
//! | 1 | Flags | |
//! | 2 | Battery, half scale | `0x7F` |
//! | 3 | Position, percent closed | `0x7F` |
//! | 4 | Light level / device chain | |
//!
//! Bytes after the model code are only decoded for curtains.

use std::collections::HashMap;

use switchbridge_domain::advertisement::{AdvertisementEvent, ServiceData};
use switchbridge_domain::model::ModelCode;

use crate::error::{BleError, PayloadParseError};

/// Legacy SwitchBot service-data UUID.
pub const SERVICE_UUID_0D00: uuid::Uuid =
    uuid::Uuid::from_u128(0x0000_0D00_0000_1000_8000_0080_5F9B_34FB);

/// Bluetooth SIG assigned SwitchBot service-data UUID.
pub const SERVICE_UUID_FD3D: uuid::Uuid =
    uuid::Uuid::from_u128(0x0000_FD3D_0000_1000_8000_0080_5F9B_34FB);

const CURTAIN_FRAME_LEN: usize = 5;
const MASK: u8 = 0x7F;

/// What one SwitchBot advertisement says about its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchBotAdvertisement {
    pub model: ModelCode,
    pub service_data: ServiceData,
}

/// Whether `uuid` is one of the SwitchBot service-data UUIDs.
#[must_use]
pub fn is_switchbot_uuid(uuid: uuid::Uuid) -> bool {
    uuid == SERVICE_UUID_0D00 || uuid == SERVICE_UUID_FD3D
}

/// Parse one service-data entry.
///
/// # Errors
///
/// Returns [`BleError::PayloadParse`] when the UUID is not a SwitchBot one
/// or the payload is empty.
pub fn parse_service_data(uuid: uuid::Uuid, data: &[u8]) -> Result<SwitchBotAdvertisement, BleError> {
    if !is_switchbot_uuid(uuid) {
        return Err(BleError::PayloadParse(PayloadParseError::UnsupportedUuid(
            uuid,
        )));
    }

    let Some(&model_byte) = data.first() else {
        return Err(BleError::PayloadParse(PayloadParseError::Empty));
    };
    let model = ModelCode::new(char::from(model_byte & MASK));

    let service_data = if model == ModelCode::CURTAIN && data.len() >= CURTAIN_FRAME_LEN {
        ServiceData {
            battery: Some(data[2] & MASK),
            position: Some(data[3] & MASK),
        }
    } else {
        ServiceData::default()
    };

    Ok(SwitchBotAdvertisement {
        model,
        service_data,
    })
}

/// First SwitchBot advertisement found in a service-data map.
#[must_use]
pub fn find_advertisement(
    service_data: &HashMap<uuid::Uuid, Vec<u8>>,
) -> Option<SwitchBotAdvertisement> {
    service_data
        .iter()
        .find_map(|(uuid, data)| parse_service_data(*uuid, data).ok())
}

/// Build the event delivered to the bridge for one advertisement, or `None`
/// when it carries nothing to publish.
#[must_use]
pub fn advertisement_event(
    address: &str,
    service_data: &HashMap<uuid::Uuid, Vec<u8>>,
) -> Option<AdvertisementEvent> {
    let advertisement = find_advertisement(service_data)?;
    if advertisement.service_data.is_empty() {
        return None;
    }
    Some(AdvertisementEvent::new(address, advertisement.service_data))
}
