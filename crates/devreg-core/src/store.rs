use async_trait::async_trait;

use crate::device::{Device, DeviceId, DeviceRecord};
use crate::error::StoreResult;

/// Durable keyed storage for device records
/// Infrastructure crates (e.g., devreg-store) implement this trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Insert or replace a record, assigning an id when it has none
    async fn save(&self, record: DeviceRecord) -> StoreResult<Device>;

    async fn find_by_id(&self, id: DeviceId) -> StoreResult<Option<Device>>;

    /// All records in store-defined order
    async fn find_all(&self) -> StoreResult<Vec<Device>>;

    async fn exists_by_id(&self, id: DeviceId) -> StoreResult<bool>;

    async fn delete_by_id(&self, id: DeviceId) -> StoreResult<()>;

    /// Records whose brand equals `brand` exactly
    async fn find_by_brand(&self, brand: &str) -> StoreResult<Vec<Device>>;
}
