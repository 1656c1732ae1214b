//! In-memory host state: selection list, registered endpoints and the last
//! value written to each attribute.

use std::collections::{BTreeMap, HashMap};

use switchbridge_app::ports::SelectKind;
use switchbridge_domain::endpoint::{AttributeUpdate, ClusterServer, EndpointDescriptor};
use switchbridge_domain::error::HostError;
use switchbridge_domain::time::{Timestamp, now};

/// One entry of the device selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub serial: String,
    pub name: String,
    pub icon: Option<String>,
    pub kind: SelectKind,
}

/// Last value written to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRecord {
    pub value: AttributeUpdate,
    pub updated_at: Timestamp,
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    ready: bool,
    selections: BTreeMap<String, Selection>,
    endpoints: BTreeMap<String, EndpointDescriptor>,
    /// Every registered endpoint id (roots and children) to its root id.
    owners: HashMap<String, String>,
    attributes: HashMap<String, BTreeMap<&'static str, AttributeRecord>>,
}

impl Store {
    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn clear_select(&mut self) {
        self.selections.clear();
    }

    pub(crate) fn select(&mut self, selection: Selection) {
        self.selections.insert(selection.serial.clone(), selection);
    }

    pub(crate) fn selections(&self) -> Vec<Selection> {
        self.selections.values().cloned().collect()
    }

    /// Register an endpoint tree, seeding attributes from its declared
    /// initial values.
    pub(crate) fn register(&mut self, endpoint: &EndpointDescriptor) -> Result<(), HostError> {
        self.ensure_ready()?;
        if let Some(id) = endpoint
            .ids()
            .into_iter()
            .find(|id| self.owners.contains_key(*id))
        {
            return Err(HostError::DuplicateEndpoint(id.to_string()));
        }

        for id in endpoint.ids() {
            self.owners.insert(id.to_string(), endpoint.id.clone());
        }
        self.seed_attributes(endpoint);
        self.endpoints.insert(endpoint.id.clone(), endpoint.clone());
        Ok(())
    }

    pub(crate) fn unregister_all(&mut self) -> usize {
        let count = self.endpoints.len();
        self.endpoints.clear();
        self.owners.clear();
        self.attributes.clear();
        count
    }

    pub(crate) fn endpoints(&self) -> Vec<EndpointDescriptor> {
        self.endpoints.values().cloned().collect()
    }

    pub(crate) fn is_registered(&self, endpoint_id: &str) -> bool {
        self.owners.contains_key(endpoint_id)
    }

    /// Record a write on a registered endpoint.
    pub(crate) fn write(
        &mut self,
        endpoint_id: &str,
        update: AttributeUpdate,
    ) -> Result<AttributeRecord, HostError> {
        self.ensure_ready()?;
        if !self.owners.contains_key(endpoint_id) {
            return Err(HostError::UnknownEndpoint(endpoint_id.to_string()));
        }
        let record = AttributeRecord {
            value: update,
            updated_at: now(),
        };
        self.attributes
            .entry(endpoint_id.to_string())
            .or_default()
            .insert(update.attribute_name(), record);
        Ok(record)
    }

    pub(crate) fn attribute(&self, endpoint_id: &str, name: &str) -> Option<AttributeRecord> {
        self.attributes.get(endpoint_id)?.get(name).copied()
    }

    /// Every attribute of an endpoint, sorted by name.
    pub(crate) fn attributes(&self, endpoint_id: &str) -> Vec<AttributeRecord> {
        self.attributes
            .get(endpoint_id)
            .map(|attributes| attributes.values().copied().collect())
            .unwrap_or_default()
    }

    fn ensure_ready(&self) -> Result<(), HostError> {
        if self.ready {
            Ok(())
        } else {
            Err(HostError::NotReady)
        }
    }

    fn seed_attributes(&mut self, endpoint: &EndpointDescriptor) {
        let at = now();
        for cluster in &endpoint.clusters {
            if let ClusterServer::PowerSourceBattery {
                bat_percent_remaining,
                charge_level,
            } = cluster
            {
                let attributes = self.attributes.entry(endpoint.id.clone()).or_default();
                for value in [
                    AttributeUpdate::BatPercentRemaining(*bat_percent_remaining),
                    AttributeUpdate::BatChargeLevel(*charge_level),
                ] {
                    attributes.insert(
                        value.attribute_name(),
                        AttributeRecord {
                            value,
                            updated_at: at,
                        },
                    );
                }
            }
        }
        for child in &endpoint.children {
            self.seed_attributes(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use switchbridge_domain::battery::ChargeLevel;
    use switchbridge_domain::cover::LiftPercent100ths;
    use switchbridge_domain::endpoint::DeviceType;

    fn curtain_endpoint(id: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            id: id.to_string(),
            device_types: vec![DeviceType::BridgedNode],
            clusters: vec![ClusterServer::Identify],
            children: vec![EndpointDescriptor {
                id: format!("{id}-main"),
                device_types: vec![DeviceType::WindowCovering],
                clusters: vec![ClusterServer::PowerSourceBattery {
                    bat_percent_remaining: 100,
                    charge_level: ChargeLevel::Ok,
                }],
                children: Vec::new(),
            }],
        }
    }

    fn ready_store() -> Store {
        let mut store = Store::default();
        store.mark_ready();
        store
    }

    #[test]
    fn should_refuse_registration_before_ready() {
        let mut store = Store::default();
        let result = store.register(&curtain_endpoint("a"));
        assert!(matches!(result, Err(HostError::NotReady)));
    }

    #[test]
    fn should_seed_battery_attributes_on_registration() {
        let mut store = ready_store();
        store.register(&curtain_endpoint("a")).unwrap();

        assert!(store.is_registered("a"));
        assert!(store.is_registered("a-main"));
        assert_eq!(
            store.attribute("a-main", "batPercentRemaining").unwrap().value,
            AttributeUpdate::BatPercentRemaining(100)
        );
        assert_eq!(
            store.attribute("a-main", "batChargeLevel").unwrap().value,
            AttributeUpdate::BatChargeLevel(ChargeLevel::Ok)
        );
    }

    #[test]
    fn should_reject_duplicate_endpoint() {
        let mut store = ready_store();
        store.register(&curtain_endpoint("a")).unwrap();
        let result = store.register(&curtain_endpoint("a"));
        assert!(matches!(result, Err(HostError::DuplicateEndpoint(id)) if id == "a"));
    }

    #[test]
    fn should_overwrite_attribute_with_latest_value() {
        let mut store = ready_store();
        store.register(&curtain_endpoint("a")).unwrap();
        let lift = |value| {
            AttributeUpdate::CurrentPositionLiftPercent100ths(LiftPercent100ths::new(value).unwrap())
        };

        store.write("a-main", lift(1_000)).unwrap();
        store.write("a-main", lift(2_000)).unwrap();

        assert_eq!(
            store
                .attribute("a-main", "currentPositionLiftPercent100ths")
                .unwrap()
                .value,
            lift(2_000)
        );
    }

    #[test]
    fn should_reject_write_to_unknown_endpoint() {
        let mut store = ready_store();
        let result = store.write("nope", AttributeUpdate::BatPercentRemaining(1));
        assert!(matches!(result, Err(HostError::UnknownEndpoint(_))));
    }

    #[test]
    fn should_forget_everything_on_unregister_all() {
        let mut store = ready_store();
        store.register(&curtain_endpoint("a")).unwrap();
        store.register(&curtain_endpoint("b")).unwrap();

        assert_eq!(store.unregister_all(), 2);
        assert!(store.endpoints().is_empty());
        assert!(store.attribute("a-main", "batChargeLevel").is_none());
        assert!(store.attributes("a-main").is_empty());
    }

    #[test]
    fn should_keep_one_selection_per_serial() {
        let mut store = Store::default();
        let selection = Selection {
            serial: "0123".to_string(),
            name: "Curtain aa".to_string(),
            icon: None,
            kind: SelectKind::Hub,
        };
        store.select(selection.clone());
        store.select(selection);
        assert_eq!(store.selections().len(), 1);

        store.clear_select();
        assert!(store.selections().is_empty());
    }
}
