//! Host platform port — the home-automation runtime that exposes bridged
//! devices to the Matter fabric.

use std::future::Future;

use switchbridge_domain::endpoint::{AttributeUpdate, EndpointDescriptor};
use switchbridge_domain::error::HostError;

/// Static facts about the host, used to fill in basic information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Vendor id of the aggregator.
    pub vendor_id: u16,
    /// Vendor name of the aggregator.
    pub vendor_name: String,
    /// Version of this bridge, as installed in the host.
    pub plugin_version: String,
    /// Version of the host itself.
    pub host_version: String,
}

/// Kind of entry shown in the host's device selection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    Hub,
    Component,
}

impl SelectKind {
    /// Lowercase name, as the host expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Component => "component",
        }
    }
}

/// Operations the bridge needs from its host.
///
/// Implementations are cheap handles (`Clone`) onto shared host state: each
/// device keeps its own copy for publishing attribute updates.
pub trait HostPlatform: Clone + Send + Sync + 'static {
    /// Resolve once the host is ready to accept devices.
    fn ready(&self) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Static host facts.
    fn info(&self) -> HostInfo;

    /// Empty the device selection list.
    fn clear_select(&self) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Add or update an entry in the device selection list.
    fn set_select_device(
        &self,
        serial: &str,
        name: &str,
        icon: Option<&str>,
        kind: SelectKind,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Whether the user allows a device with this name to be exposed.
    fn validate_device(&self, name: &str) -> bool;

    /// Expose an endpoint (and its children) to the fabric.
    fn register_device(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Remove every endpoint this bridge registered.
    fn unregister_all_devices(&self) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Write one attribute on an endpoint.
    fn update_attribute(
        &self,
        endpoint_id: &str,
        update: AttributeUpdate,
    ) -> impl Future<Output = Result<(), HostError>> + Send;
}
