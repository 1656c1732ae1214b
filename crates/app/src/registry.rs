//! Device registry — the translators discovered during this session, keyed
//! by address.
//!
//! Written by the orchestrator during discovery, read by the router on
//! every advertisement. Entries are never removed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use switchbridge_domain::address::DeviceAddress;

pub struct DeviceRegistry<D> {
    devices: RwLock<HashMap<DeviceAddress, Arc<D>>>,
}

impl<D> DeviceRegistry<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a device, returning the one it replaced.
    pub fn insert(&self, address: DeviceAddress, device: Arc<D>) -> Option<Arc<D>> {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, device)
    }

    #[must_use]
    pub fn get(&self, address: &DeviceAddress) -> Option<Arc<D>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, address: &DeviceAddress) -> bool {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered device, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<D>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Snapshot of every registered address, sorted.
    #[must_use]
    pub fn addresses(&self) -> Vec<DeviceAddress> {
        let mut addresses: Vec<_> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        addresses.sort();
        addresses
    }
}

impl<D> Default for DeviceRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_empty() {
        let registry = DeviceRegistry::<u8>::new();
        assert!(registry.is_empty());
        assert!(registry.get(&DeviceAddress::new("aa:bb:cc")).is_none());
    }

    #[test]
    fn should_find_device_by_normalised_address() {
        let registry = DeviceRegistry::new();
        registry.insert(DeviceAddress::new("AA:BB:CC"), Arc::new(1_u8));

        assert!(registry.contains(&DeviceAddress::new("aa:bb:cc")));
        assert_eq!(
            registry.get(&DeviceAddress::new("aA:Bb:cC")).as_deref(),
            Some(&1)
        );
    }

    #[test]
    fn should_replace_device_with_same_address() {
        let registry = DeviceRegistry::new();
        registry.insert(DeviceAddress::new("aa:bb:cc"), Arc::new(1_u8));
        let previous = registry.insert(DeviceAddress::new("aa:bb:cc"), Arc::new(2_u8));

        assert_eq!(previous.as_deref(), Some(&1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_list_sorted_addresses() {
        let registry = DeviceRegistry::new();
        registry.insert(DeviceAddress::new("dd:ee:ff"), Arc::new(2_u8));
        registry.insert(DeviceAddress::new("aa:bb:cc"), Arc::new(1_u8));

        assert_eq!(
            registry.addresses(),
            vec![DeviceAddress::new("aa:bb:cc"), DeviceAddress::new("dd:ee:ff")]
        );
        assert_eq!(registry.all().len(), 2);
    }
}
