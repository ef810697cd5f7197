//! In-process device store

use async_trait::async_trait;
use devreg_core::{Device, DeviceId, DeviceRecord, DeviceStore, StoreResult};
use tokio::sync::RwLock;

use crate::table::DeviceTable;

/// Device store backed by an id-ordered map
///
/// `find_all` and `find_by_brand` return records in ascending id order.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    table: RwLock<DeviceTable>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let next_id = devices
            .iter()
            .map(|d| d.id.next())
            .max()
            .unwrap_or(DeviceId(1));
        Self {
            table: RwLock::new(DeviceTable::from_parts(devices, next_id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.all().len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn save(&self, record: DeviceRecord) -> StoreResult<Device> {
        self.table.write().await.save(record)
    }

    async fn find_by_id(&self, id: DeviceId) -> StoreResult<Option<Device>> {
        Ok(self.table.read().await.get(id))
    }

    async fn find_all(&self) -> StoreResult<Vec<Device>> {
        Ok(self.table.read().await.all())
    }

    async fn exists_by_id(&self, id: DeviceId) -> StoreResult<bool> {
        Ok(self.table.read().await.contains(id))
    }

    async fn delete_by_id(&self, id: DeviceId) -> StoreResult<()> {
        self.table.write().await.remove(id);
        Ok(())
    }

    async fn find_by_brand(&self, brand: &str) -> StoreResult<Vec<Device>> {
        Ok(self.table.read().await.by_brand(brand))
    }
}
