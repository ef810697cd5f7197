//! Device store persisted as a JSON snapshot
//!
//! The whole table is rewritten to disk after every mutation. A write is
//! applied to a copy of the table first and only becomes visible once the
//! snapshot has been saved, so a failed write leaves both disk and memory
//! as they were.

use async_trait::async_trait;
use devreg_core::{Device, DeviceId, DeviceRecord, DeviceStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::table::DeviceTable;

/// On-disk snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Version of the snapshot format
    #[serde(default = "default_version")]
    pub version: String,
    /// Id the next created device receives
    pub next_id: DeviceId,
    #[serde(default)]
    pub devices: Vec<Device>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: default_version(),
            next_id: DeviceId(1),
            devices: Vec::new(),
        }
    }
}

impl StoreSnapshot {
    /// Load snapshot from a file
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    /// Load snapshot or create an empty one if the file doesn't exist
    pub fn load_or_create(path: &Path) -> StoreResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save snapshot to a file
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn from_table(table: &DeviceTable) -> Self {
        Self {
            version: default_version(),
            next_id: table.next_id(),
            devices: table.all(),
        }
    }
}

/// Device store that persists every write to a JSON file
#[derive(Debug)]
pub struct FileDeviceStore {
    path: PathBuf,
    table: RwLock<DeviceTable>,
}

impl FileDeviceStore {
    /// Open the store at `path`, creating an empty snapshot if none exists
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let existed = path.exists();
        let snapshot = StoreSnapshot::load_or_create(&path)?;
        if !existed {
            snapshot.save(&path)?;
        }

        info!(
            path = %path.display(),
            count = snapshot.devices.len(),
            "Opened device store"
        );

        Ok(Self {
            table: RwLock::new(DeviceTable::from_parts(snapshot.devices, snapshot.next_id)),
            path,
        })
    }

    /// Run `f` against a copy of the table, persist it, then publish it
    async fn write<T>(
        &self,
        f: impl FnOnce(&mut DeviceTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut table = self.table.write().await;
        let mut next = table.clone();
        let out = f(&mut next)?;

        let snapshot = StoreSnapshot::from_table(&next);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || snapshot.save(&path))
            .await
            .map_err(|e| StoreError::Backend(format!("snapshot task failed: {e}")))??;

        *table = next;
        debug!(path = %self.path.display(), "Saved device snapshot");
        Ok(out)
    }
}

#[async_trait]
impl DeviceStore for FileDeviceStore {
    async fn save(&self, record: DeviceRecord) -> StoreResult<Device> {
        self.write(|table| table.save(record)).await
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
        if !self.table.read().await.contains(id) {
            return Ok(());
        }
        self.write(|table| {
            table.remove(id);
            Ok(())
        })
        .await
    }

    async fn find_by_brand(&self, brand: &str) -> StoreResult<Vec<Device>> {
        Ok(self.table.read().await.by_brand(brand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn record(name: &str, brand: &str) -> DeviceRecord {
        DeviceRecord::new(
            name.to_string(),
            brand.to_string(),
            Utc.with_ymd_and_hms(2024, 11, 3, 17, 45, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_open_creates_empty_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("devices.json");

        let store = FileDeviceStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devices.json");

        let (kept, removed) = {
            let store = FileDeviceStore::open(&path).unwrap();
            let kept = store.save(record("Galaxy", "Samsung")).await.unwrap();
            let removed = store.save(record("Pixel", "Google")).await.unwrap();
            store.delete_by_id(removed.id).await.unwrap();
            (kept, removed)
        };

        let store = FileDeviceStore::open(&path).unwrap();
        assert_eq!(store.find_all().await.unwrap(), vec![kept]);
        assert!(!store.exists_by_id(removed.id).await.unwrap());

        // Deleted ids are not handed out again after a restart
        let next = store.save(record("Xperia", "Sony")).await.unwrap();
        assert_eq!(next.id, DeviceId(3));
    }

    #[tokio::test]
    async fn test_save_for_deleted_id_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devices.json");
        let store = FileDeviceStore::open(&path).unwrap();
        let device = store.save(record("Galaxy", "Samsung")).await.unwrap();
        store.delete_by_id(device.id).await.unwrap();

        let err = store.save(device.clone().into()).await.unwrap_err();
        assert!(matches!(err, StoreError::Vanished(id) if id == device.id));

        let reopened = FileDeviceStore::open(&path).unwrap();
        assert!(!reopened.exists_by_id(device.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_brand_exact_match() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileDeviceStore::open(temp_dir.path().join("devices.json")).unwrap();
        store.save(record("a", "Acme")).await.unwrap();
        store.save(record("b", "acme")).await.unwrap();

        let found = store.find_by_brand("Acme").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "a");
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devices.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileDeviceStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devices.json");
        let store = FileDeviceStore::open(&path).unwrap();
        let kept = store.save(record("a", "Acme")).await.unwrap();

        // Replace the snapshot file with a directory so the next write fails
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = store.save(record("b", "Acme")).await.unwrap_err();
        assert!(matches!(err, StoreError::IoError(_)));
        assert_eq!(store.find_all().await.unwrap(), vec![kept]);
    }
}
