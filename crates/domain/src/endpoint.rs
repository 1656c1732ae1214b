//! Endpoint descriptors — the capability surface a device declares to the
//! host — and the attribute updates it publishes afterwards.
//!
//! Descriptors are plain data. The host adapter decides how to turn them
//! into real clusters.

use serde::{Deserialize, Serialize};

use crate::battery::ChargeLevel;
use crate::cover::LiftPercent100ths;

/// Length of the hex serial number derived from an endpoint id.
pub const SERIAL_LEN: usize = 16;

/// Stable identity of a bridged device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Endpoint id, `"<prefix>-<name>"`.
    pub id: String,
    /// Human readable device name.
    pub name: String,
    /// Content-derived serial number.
    pub serial: String,
}

impl DeviceIdentity {
    /// Compose `"<prefix>-<name>"` and derive the serial from it.
    #[must_use]
    pub fn derive(prefix: &str, name: &str) -> Self {
        let id = format!("{prefix}-{name}");
        let serial = serial_for(&id);
        Self {
            id,
            name: name.to_string(),
            serial,
        }
    }
}

/// Hash `key` into a [`SERIAL_LEN`]-character lowercase hex serial.
///
/// Uses a name-based (v5) UUID so the same key always yields the same serial
/// across restarts and machines.
#[must_use]
pub fn serial_for(key: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, key.as_bytes())
        .simple()
        .to_string()
        .chars()
        .take(SERIAL_LEN)
        .collect()
}

/// Numeric form of a version string: its digits, concatenated.
///
/// `"1.2.3"` becomes `123`. Strings without digits (or too many) yield `0`.
#[must_use]
pub fn version_number(version: &str) -> u32 {
    let digits: String = version.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Display form of a version string, `"Unknown"` when empty.
#[must_use]
pub fn version_label(version: &str) -> String {
    if version.is_empty() {
        "Unknown".to_string()
    } else {
        version.to_string()
    }
}

/// Matter device types used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    BridgedNode,
    WindowCovering,
}

/// `WindowCovering.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowCoveringType {
    Drapery,
}

/// `WindowCovering.EndProductType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndProductType {
    LateralLeftCurtain,
}

/// Bridged Device Basic Information cluster contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInformation {
    pub device_name: String,
    pub serial_number: String,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_name: String,
    pub software_version: u32,
    pub software_version_string: String,
    pub hardware_version: u32,
    pub hardware_version_string: String,
}

/// A cluster server declared on an endpoint, with its initial values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cluster", rename_all = "snake_case")]
pub enum ClusterServer {
    Identify,
    Groups,
    BridgedDeviceBasicInformation(BasicInformation),
    WindowCovering {
        covering_type: WindowCoveringType,
        end_product_type: EndProductType,
    },
    PowerSourceBattery {
        bat_percent_remaining: u8,
        charge_level: ChargeLevel,
    },
}

/// An endpoint and its children, as declared to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub id: String,
    pub device_types: Vec<DeviceType>,
    pub clusters: Vec<ClusterServer>,
    pub children: Vec<EndpointDescriptor>,
}

impl EndpointDescriptor {
    /// Basic information of this endpoint, if declared.
    #[must_use]
    pub fn basic_information(&self) -> Option<&BasicInformation> {
        self.clusters.iter().find_map(|cluster| match cluster {
            ClusterServer::BridgedDeviceBasicInformation(info) => Some(info),
            _ => None,
        })
    }

    /// Ids of this endpoint and all its descendants, depth first.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = vec![self.id.as_str()];
        for child in &self.children {
            ids.extend(child.ids());
        }
        ids
    }
}

/// Clusters whose attributes the bridge publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterId {
    WindowCovering,
    PowerSource,
}

impl ClusterId {
    /// Matter cluster id.
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::WindowCovering => 0x0102,
            Self::PowerSource => 0x002F,
        }
    }
}

/// A single attribute write published to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum AttributeUpdate {
    CurrentPositionLiftPercent100ths(LiftPercent100ths),
    BatPercentRemaining(u8),
    BatChargeLevel(ChargeLevel),
}

impl AttributeUpdate {
    /// Cluster the attribute belongs to.
    #[must_use]
    pub const fn cluster(self) -> ClusterId {
        match self {
            Self::CurrentPositionLiftPercent100ths(_) => ClusterId::WindowCovering,
            Self::BatPercentRemaining(_) | Self::BatChargeLevel(_) => ClusterId::PowerSource,
        }
    }

    /// Matter attribute name.
    #[must_use]
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::CurrentPositionLiftPercent100ths(_) => "currentPositionLiftPercent100ths",
            Self::BatPercentRemaining(_) => "batPercentRemaining",
            Self::BatChargeLevel(_) => "batChargeLevel",
        }
    }
}
