//! Id-ordered device table shared by the store backends

use devreg_core::{Device, DeviceId, DeviceRecord, StoreError, StoreResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub(crate) struct DeviceTable {
    devices: BTreeMap<DeviceId, Device>,
    next_id: DeviceId,
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self {
            devices: BTreeMap::new(),
            next_id: DeviceId(1),
        }
    }
}

impl DeviceTable {
    pub(crate) fn from_parts(devices: Vec<Device>, next_id: DeviceId) -> Self {
        let mut table = Self {
            devices: BTreeMap::new(),
            next_id,
        };
        for device in devices {
            table.insert(device);
        }
        table
    }

    pub(crate) fn next_id(&self) -> DeviceId {
        self.next_id
    }

    /// Insert a new record or replace a stored one
    ///
    /// Records without an id take the next free one. A record naming an id
    /// that is not stored is rejected, so a removed device stays removed.
    pub(crate) fn save(&mut self, record: DeviceRecord) -> StoreResult<Device> {
        let id = match record.id {
            Some(id) if !self.devices.contains_key(&id) => return Err(StoreError::Vanished(id)),
            Some(id) => id,
            None => self.next_id,
        };
        let device = record.with_id(id);
        self.insert(device.clone());
        Ok(device)
    }

    fn insert(&mut self, device: Device) {
        if device.id >= self.next_id {
            self.next_id = device.id.next();
        }
        self.devices.insert(device.id, device);
    }

    pub(crate) fn get(&self, id: DeviceId) -> Option<Device> {
        self.devices.get(&id).cloned()
    }

    pub(crate) fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub(crate) fn remove(&mut self, id: DeviceId) -> Option<Device> {
        self.devices.remove(&id)
    }

    pub(crate) fn all(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }

    pub(crate) fn by_brand(&self, brand: &str) -> Vec<Device> {
        self.devices
            .values()
            .filter(|d| d.brand == brand)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(name: &str) -> DeviceRecord {
        DeviceRecord::new(name.into(), "x".into(), Utc::now())
    }

    #[test]
    fn test_ids_are_assigned_in_order() {
        let mut table = DeviceTable::default();
        let a = table.save(record("a")).unwrap();
        let b = table.save(record("b")).unwrap();
        assert_eq!(a.id, DeviceId(1));
        assert_eq!(b.id, DeviceId(2));
    }

    #[test]
    fn test_seeded_id_advances_counter() {
        let seeded = record("a").with_id(DeviceId(10));
        let mut table = DeviceTable::from_parts(vec![seeded], DeviceId(1));
        assert_eq!(table.next_id(), DeviceId(11));

        let next = table.save(record("b")).unwrap();
        assert_eq!(next.id, DeviceId(11));
    }

    #[test]
    fn test_save_replaces_stored_record() {
        let mut table = DeviceTable::default();
        let a = table.save(record("a")).unwrap();

        let mut renamed = DeviceRecord::from(a.clone());
        renamed.name = "renamed".to_string();
        let saved = table.save(renamed).unwrap();

        assert_eq!(saved.id, a.id);
        assert_eq!(table.all().len(), 1);
        assert_eq!(table.get(a.id).map(|d| d.name), Some("renamed".to_string()));
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut table = DeviceTable::default();
        let a = table.save(record("a")).unwrap();
        table.remove(a.id);
        let b = table.save(record("b")).unwrap();
        assert_eq!(b.id, DeviceId(2));
    }

    #[test]
    fn test_save_for_removed_id_is_rejected() {
        let mut table = DeviceTable::default();
        let a = table.save(record("a")).unwrap();
        table.remove(a.id);

        let err = table.save(DeviceRecord::from(a.clone())).unwrap_err();
        assert!(matches!(err, StoreError::Vanished(id) if id == a.id));
        assert!(!table.contains(a.id));
        assert_eq!(table.next_id(), DeviceId(2));
    }
}
