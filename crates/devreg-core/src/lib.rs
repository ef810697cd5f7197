//! devreg Core - Device records, validation rules, and the device registry
//!
//! This crate provides the foundational pieces of the devreg service:
//! - Device record types and the wire shape of create/update candidates
//! - Pure validation of candidates and partial updates
//! - The error taxonomy every registry operation reports through
//! - The `DeviceStore` trait persistence backends implement
//! - The `Registry` service that enforces lifecycle rules

pub mod clock;
pub mod device;
pub mod error;
pub mod registry;
pub mod store;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use device::{Device, DeviceDraft, DeviceField, DeviceId, DeviceRecord};
pub use error::{
    FieldViolation, RegistryError, RegistryResult, StoreError, StoreResult, ValidationErrors,
    ViolationKind,
};
pub use registry::{PatchPolicy, Registry, RegistryOptions};
pub use store::DeviceStore;
pub use validate::{
    parse_patch, validate_draft, validate_patch, DevicePatch, PatchField, ValidDraft,
};
