//! Configuration types for the wallet selector store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SelectorError;
use crate::traits::SelectorResult;

/// Namespace every persisted key is prefixed with
pub const DEFAULT_NAMESPACE: &str = "near-wallet-selector";

/// Main store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage key namespace
    pub namespace: String,

    /// Storage backend configuration
    pub storage: StorageConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Parse from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> SelectorResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SelectorError::Config(e.to_string()))?;
        if config.namespace.is_empty() {
            return Err(SelectorError::Config("namespace must not be empty".to_string()));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> SelectorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Which storage backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// sled database under `data_dir`
    Sled,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Data directory, used by on-disk backends
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}
