//! Application state management

use anyhow::Result;
use devreg_core::{DeviceStore, Registry, SystemClock};
use devreg_store::{FileDeviceStore, MemoryDeviceStore};
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthState;
use crate::config::{Config, StoreBackend};

/// Shared application state
pub struct AppState {
    /// Device registry
    pub registry: Registry,
    /// Bearer token checks for protected routes
    pub auth: Arc<AuthState>,
}

impl AppState {
    /// Create new application state, opening the configured store
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let store = open_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Create state around an already-open store
    pub fn with_store(config: Config, store: Arc<dyn DeviceStore>) -> Arc<Self> {
        let registry = Registry::with_options(
            store,
            Arc::new(SystemClock),
            config.registry.to_options(),
        );
        let auth = Arc::new(AuthState::new(config.auth));

        Arc::new(Self { registry, auth })
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn DeviceStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory device store");
            Ok(Arc::new(MemoryDeviceStore::new()))
        }
        StoreBackend::File => {
            let store = FileDeviceStore::open(&config.store.path)?;
            Ok(Arc::new(store))
        }
    }
}
