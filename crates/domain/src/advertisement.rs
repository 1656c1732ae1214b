//! Advertisement events delivered by the continuous scan.

use serde::{Deserialize, Serialize};

use crate::address::DeviceAddress;

/// Partial state carried by one advertisement. Either field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceData {
    /// Raw device position, whole percent.
    pub position: Option<u8>,
    /// Raw battery value, half scale.
    pub battery: Option<u8>,
}

impl ServiceData {
    /// Whether the advertisement carries nothing to publish.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.battery.is_none()
    }
}

/// One advertisement, keyed by the (normalised) address of its sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementEvent {
    pub address: DeviceAddress,
    pub service_data: ServiceData,
}

impl AdvertisementEvent {
    /// Build an event, normalising the reported address.
    #[must_use]
    pub fn new(address: impl AsRef<str>, service_data: ServiceData) -> Self {
        Self {
            address: DeviceAddress::new(address),
            service_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_normalise_event_address() {
        let event = AdvertisementEvent::new("AA:BB:CC:DD:EE:FF", ServiceData::default());
        assert_eq!(event.address.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn should_report_empty_service_data() {
        assert!(ServiceData::default().is_empty());
        assert!(
            !ServiceData {
                position: Some(10),
                battery: None,
            }
            .is_empty()
        );
    }
}
