//! Device registry: the operations callers run against the device store
//!
//! The registry holds no device state of its own. Each call is a
//! self-contained read-modify-write against the store; concurrent writes to
//! the same id resolve as last-write-wins at the store. A write that lands
//! after a concurrent delete reports NotFound instead of restoring the record.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::device::{Device, DeviceDraft, DeviceId, DeviceRecord};
use crate::error::{RegistryError, RegistryResult, StoreError};
use crate::store::DeviceStore;
use crate::validate::{parse_patch, validate_draft, validate_patch};

/// How strictly patched values are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchPolicy {
    /// Values are type-checked only; an empty name or brand is accepted
    #[default]
    Lenient,
    /// Supplied values must also pass the create-time field rules
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryOptions {
    pub patch_policy: PatchPolicy,
}

/// Device registry service
pub struct Registry {
    store: Arc<dyn DeviceStore>,
    clock: Arc<dyn Clock>,
    options: RegistryOptions,
}

impl Registry {
    pub fn new(store: Arc<dyn DeviceStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(store, clock, RegistryOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn DeviceStore>,
        clock: Arc<dyn Clock>,
        options: RegistryOptions,
    ) -> Self {
        Self {
            store,
            clock,
            options,
        }
    }

    /// Validate and persist a new device
    pub async fn create(&self, draft: DeviceDraft) -> RegistryResult<Device> {
        let now = self.clock.now();
        let valid = validate_draft(draft, now)?;

        debug!(name = %valid.name, brand = %valid.brand, "Creating device");

        let record = DeviceRecord::new(valid.name, valid.brand, valid.creation_time.unwrap_or(now));
        let device = self
            .store
            .save(record)
            .await
            .map_err(store_failure("Error adding device"))?;

        info!(device = %device.id, brand = %device.brand, "Device created");
        Ok(device)
    }

    /// Get a device by ID
    pub async fn get_by_id(&self, id: DeviceId) -> RegistryResult<Device> {
        debug!(device = %id, "Getting device");
        self.load(id, "Error retrieving device").await
    }

    /// Every stored device, in store order
    pub async fn get_all(&self) -> RegistryResult<Vec<Device>> {
        let devices = self
            .store
            .find_all()
            .await
            .map_err(store_failure("Error retrieving devices"))?;

        debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }

    /// Replace name, brand and creation time of an existing device
    pub async fn update(&self, id: DeviceId, draft: DeviceDraft) -> RegistryResult<Device> {
        let mut device = self.load(id, "Error updating device").await?;

        let now = self.clock.now();
        let valid = validate_draft(draft, now)?;
        device.name = valid.name;
        device.brand = valid.brand;
        device.creation_time = valid.creation_time.unwrap_or(now);

        let device = self
            .store
            .save(device.into())
            .await
            .map_err(store_failure("Error updating device"))?;

        info!(device = %device.id, "Device updated");
        Ok(device)
    }

    /// Apply only the supplied fields to an existing device
    ///
    /// The field map is parsed in full before anything is written, so an
    /// unknown or mistyped entry leaves the stored record untouched.
    pub async fn update_partial(
        &self,
        id: DeviceId,
        fields: Map<String, Value>,
    ) -> RegistryResult<Device> {
        let mut device = self.load(id, "Error partially updating device").await?;

        let patch = parse_patch(fields)?;
        if self.options.patch_policy == PatchPolicy::Strict {
            validate_patch(&patch, self.clock.now())?;
        }

        debug!(device = %id, fields = patch.fields().len(), "Patching device");
        patch.apply_to(&mut device);

        let device = self
            .store
            .save(device.into())
            .await
            .map_err(store_failure("Error partially updating device"))?;

        info!(device = %device.id, "Device partially updated");
        Ok(device)
    }

    /// Remove a device; a second delete of the same id reports NotFound
    pub async fn delete(&self, id: DeviceId) -> RegistryResult<()> {
        let exists = self
            .store
            .exists_by_id(id)
            .await
            .map_err(store_failure("Error deleting device"))?;
        if !exists {
            return Err(RegistryError::NotFound(id));
        }

        self.store
            .delete_by_id(id)
            .await
            .map_err(store_failure("Error deleting device"))?;

        info!(device = %id, "Device deleted");
        Ok(())
    }

    /// Devices whose brand matches exactly (case-sensitive)
    ///
    /// No match is an empty list, not an error.
    pub async fn search_by_brand(&self, brand: &str) -> RegistryResult<Vec<Device>> {
        let devices = self
            .store
            .find_by_brand(brand)
            .await
            .map_err(store_failure("Error finding devices by brand"))?;

        debug!(brand = %brand, count = devices.len(), "Searched devices by brand");
        Ok(devices)
    }

    async fn load(&self, id: DeviceId, operation: &'static str) -> RegistryResult<Device> {
        self.store
            .find_by_id(id)
            .await
            .map_err(store_failure(operation))?
            .ok_or(RegistryError::NotFound(id))
    }
}

fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> RegistryError {
    move |source| match source {
        StoreError::Vanished(id) => {
            warn!(device = %id, operation, "Device removed while being updated");
            RegistryError::NotFound(id)
        }
        source => {
            warn!(error = %source, operation, "Device store failure");
            RegistryError::service(operation)(source)
        }
    }
}
