//! Configuration loading and validation

use anyhow::Result;
use devreg_core::{PatchPolicy, RegistryOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tls: None,
        }
    }
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format)
    pub cert: String,
    /// Path to private key file (PEM format)
    pub key: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Which device store backs the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Records live only as long as the process
    #[default]
    Memory,
    /// Records are persisted to a JSON snapshot at `store.path`
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Snapshot path for the file backend
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "./devices.json".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Reject empty names/brands and future timestamps in PATCH bodies too
    #[serde(default)]
    pub strict_patch: bool,
}

impl RegistryConfig {
    pub fn to_options(&self) -> RegistryOptions {
        RegistryOptions {
            patch_policy: if self.strict_patch {
                PatchPolicy::Strict
            } else {
                PatchPolicy::Lenient
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a bearer token on protected methods
    #[serde(default)]
    pub require_token: bool,
    /// Accepted bearer tokens
    #[serde(default)]
    pub tokens: Vec<String>,
    /// HTTP methods that need a token when `require_token` is set
    #[serde(default = "default_protected_methods")]
    pub protected_methods: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_token: false,
            tokens: Vec::new(),
            protected_methods: default_protected_methods(),
        }
    }
}

fn default_protected_methods() -> Vec<String> {
    vec!["PATCH".to_string()]
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        store: StoreConfig {
            backend: StoreBackend::File,
            path: default_store_path(),
        },
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}
