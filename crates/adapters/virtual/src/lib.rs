//! # switchbridge-adapter-virtual
//!
//! In-process host platform. Stands in for a Matter aggregator: it keeps the
//! bridged endpoints, the device selection list and every attribute value
//! in memory, and broadcasts each attribute write to subscribers.
//!
//! ## What it offers
//!
//! | Host operation | Behaviour |
//! |----------------|-----------|
//! | `ready` | Marks the host ready; registration and writes fail before that |
//! | `set_select_device` | One entry per serial, last write wins |
//! | `validate_device` | Accepts every name not in the configured reject list |
//! | `register_device` | Stores the endpoint tree, seeds battery attributes, rejects duplicate ids |
//! | `update_attribute` | Stores the value with a timestamp and broadcasts an [`AttributeChange`] |
//!
//! ## Dependency rule
//!
//! Depends on `switchbridge-app` (port traits) and `switchbridge-domain` only.

mod store;

pub use store::{AttributeRecord, Selection};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use switchbridge_app::ports::{HostInfo, HostPlatform, SelectKind};
use switchbridge_domain::endpoint::{AttributeUpdate, EndpointDescriptor};
use switchbridge_domain::error::HostError;
use switchbridge_domain::time::Timestamp;

use store::Store;

/// Static configuration of the virtual host.
#[derive(Debug, Clone)]
pub struct VirtualHostConfig {
    pub vendor_id: u16,
    pub vendor_name: String,
    /// Version of the bridge, reported as the software version.
    pub plugin_version: String,
    /// Version of the host, reported as the hardware version.
    pub host_version: String,
    /// Device names `validate_device` refuses.
    pub reject_names: Vec<String>,
    /// Capacity of the attribute change channel.
    pub channel_capacity: usize,
}

impl Default for VirtualHostConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0xFFF1,
            vendor_name: "switchbridge".to_string(),
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
            host_version: String::new(),
            reject_names: Vec::new(),
            channel_capacity: 64,
        }
    }
}

/// An attribute write, as broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub endpoint_id: String,
    pub update: AttributeUpdate,
    pub at: Timestamp,
}

struct Inner {
    config: VirtualHostConfig,
    store: Mutex<Store>,
    changes: broadcast::Sender<AttributeChange>,
}

/// In-memory [`HostPlatform`]. Clones share the same state.
#[derive(Clone)]
pub struct VirtualHost {
    inner: Arc<Inner>,
}

impl VirtualHost {
    #[must_use]
    pub fn new(config: VirtualHostConfig) -> Self {
        let (changes, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                store: Mutex::new(Store::default()),
                changes,
            }),
        }
    }

    /// Subscribe to attribute writes made after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AttributeChange> {
        self.inner.changes.subscribe()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.store().is_ready()
    }

    /// Current value of one attribute.
    #[must_use]
    pub fn attribute(&self, endpoint_id: &str, name: &str) -> Option<AttributeRecord> {
        self.store().attribute(endpoint_id, name)
    }

    /// Snapshot of every attribute of an endpoint.
    #[must_use]
    pub fn attributes(&self, endpoint_id: &str) -> Vec<AttributeRecord> {
        self.store().attributes(endpoint_id)
    }

    /// Registered endpoint trees, sorted by root id.
    #[must_use]
    pub fn registered_endpoints(&self) -> Vec<EndpointDescriptor> {
        self.store().endpoints()
    }

    #[must_use]
    pub fn is_registered(&self, endpoint_id: &str) -> bool {
        self.store().is_registered(endpoint_id)
    }

    /// The device selection list, sorted by serial.
    #[must_use]
    pub fn selections(&self) -> Vec<Selection> {
        self.store().selections()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostPlatform for VirtualHost {
    async fn ready(&self) -> Result<(), HostError> {
        self.store().mark_ready();
        tracing::debug!("virtual host ready");
        Ok(())
    }

    fn info(&self) -> HostInfo {
        let config = &self.inner.config;
        HostInfo {
            vendor_id: config.vendor_id,
            vendor_name: config.vendor_name.clone(),
            plugin_version: config.plugin_version.clone(),
            host_version: config.host_version.clone(),
        }
    }

    async fn clear_select(&self) -> Result<(), HostError> {
        self.store().clear_select();
        Ok(())
    }

    async fn set_select_device(
        &self,
        serial: &str,
        name: &str,
        icon: Option<&str>,
        kind: SelectKind,
    ) -> Result<(), HostError> {
        self.store().select(Selection {
            serial: serial.to_string(),
            name: name.to_string(),
            icon: icon.map(str::to_string),
            kind,
        });
        Ok(())
    }

    fn validate_device(&self, name: &str) -> bool {
        !self
            .inner
            .config
            .reject_names
            .iter()
            .any(|rejected| rejected == name)
    }

    async fn register_device(&self, endpoint: &EndpointDescriptor) -> Result<(), HostError> {
        self.store().register(endpoint)?;
        tracing::info!(endpoint = %endpoint.id, "endpoint registered");
        Ok(())
    }

    async fn unregister_all_devices(&self) -> Result<(), HostError> {
        let count = self.store().unregister_all();
        tracing::info!(count, "all endpoints unregistered");
        Ok(())
    }

    async fn update_attribute(
        &self,
        endpoint_id: &str,
        update: AttributeUpdate,
    ) -> Result<(), HostError> {
        let record = self.store().write(endpoint_id, update)?;
        tracing::debug!(
            endpoint = endpoint_id,
            attribute = update.attribute_name(),
            ?update,
            "attribute updated"
        );
        // no subscribers is fine
        let _ = self.inner.changes.send(AttributeChange {
            endpoint_id: endpoint_id.to_string(),
            update,
            at: record.updated_at,
        });
        Ok(())
    }
}
