//! Advertisement router — hands each advertisement to the translator
//! registered for its sender.
//!
//! Every device gets its own bounded queue and a single worker draining it,
//! so updates for one device apply in arrival order while devices stay
//! independent of each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use switchbridge_domain::address::DeviceAddress;
use switchbridge_domain::advertisement::{AdvertisementEvent, ServiceData};

use crate::devices::Translator;
use crate::ports::{AdvertisementCallback, BlePeripheral, HostPlatform, ScanControl};
use crate::registry::DeviceRegistry;

/// Advertisements waiting for one device before new ones are dropped.
pub const QUEUE_CAPACITY: usize = 128;

type Queues = Arc<Mutex<HashMap<DeviceAddress, mpsc::Sender<ServiceData>>>>;

/// Dispatches advertisements without ever blocking the scan listener.
///
/// Clones share the per-device queues. Workers stop once every clone is
/// dropped and their queue is drained.
pub struct AdvertisementRouter<P, S, H> {
    registry: Arc<DeviceRegistry<Translator<P, S, H>>>,
    queues: Queues,
}

impl<P, S, H> Clone for AdvertisementRouter<P, S, H> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            queues: Arc::clone(&self.queues),
        }
    }
}

impl<P, S, H> AdvertisementRouter<P, S, H>
where
    P: BlePeripheral,
    S: ScanControl,
    H: HostPlatform,
{
    pub fn new(registry: Arc<DeviceRegistry<Translator<P, S, H>>>) -> Self {
        Self {
            registry,
            queues: Arc::default(),
        }
    }

    /// Route one advertisement, returning whether it was queued.
    ///
    /// Advertisements from unregistered addresses are dropped, as are those
    /// arriving while the device's queue is full. Failures while applying an
    /// update are logged by the worker and never reach the caller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn route(&self, event: AdvertisementEvent) -> bool {
        let Some(device) = self.registry.get(&event.address) else {
            tracing::trace!(address = %event.address, "advertisement from unregistered address dropped");
            return false;
        };

        match self.queue_for(&event.address, device).try_send(event.service_data) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(address = %event.address, "advertisement queue full, dropping update");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(address = %event.address, "advertisement worker gone, dropping update");
                false
            }
        }
    }

    /// Wrap this router as a transport callback.
    pub fn into_callback(self) -> AdvertisementCallback {
        Arc::new(move |event: AdvertisementEvent| {
            self.route(event);
        })
    }

    fn queue_for(
        &self,
        address: &DeviceAddress,
        device: Arc<Translator<P, S, H>>,
    ) -> mpsc::Sender<ServiceData> {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = queues.get(address)
            && !sender.is_closed()
        {
            return sender.clone();
        }

        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(drain(device, receiver));
        queues.insert(address.clone(), sender.clone());
        tracing::debug!(%address, "advertisement worker started");
        sender
    }
}

/// Apply queued advertisements one at a time, in arrival order.
async fn drain<P, S, H>(device: Arc<Translator<P, S, H>>, mut queue: mpsc::Receiver<ServiceData>)
where
    P: BlePeripheral,
    S: ScanControl,
    H: HostPlatform,
{
    while let Some(data) = queue.recv().await {
        if let Err(err) = device.handle_advertisement(&data).await {
            tracing::warn!(address = %device.address(), error = %err, "failed to apply advertisement");
        }
    }
    tracing::debug!(address = %device.address(), "advertisement worker stopped");
}
