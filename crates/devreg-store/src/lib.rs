//! devreg Store - Device store backends
//!
//! - `MemoryDeviceStore` keeps records in process memory
//! - `FileDeviceStore` additionally persists a JSON snapshot after every write

pub mod file;
pub mod memory;
mod table;

pub use file::{FileDeviceStore, StoreSnapshot};
pub use memory::MemoryDeviceStore;
