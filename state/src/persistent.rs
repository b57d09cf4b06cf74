//! Persistent storage backend using sled database

use async_trait::async_trait;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use wallet_selector_core::{
    SelectorError, SelectorResult, StorageBackend, StorageConfig, StorageService,
};

use crate::memory::MemoryStorage;

const STORAGE_TREE: &str = "storage";

/// Persistent key-value storage backed by sled database
pub struct SledStorage {
    db: Db,
    items: Tree,
}

impl SledStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> SelectorResult<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| SelectorError::Storage(e.to_string()))?;
        let items = db
            .open_tree(STORAGE_TREE)
            .map_err(|e| SelectorError::Storage(e.to_string()))?;

        debug!(path = %path.as_ref().display(), "Opened sled storage");

        Ok(Self { db, items })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> SelectorResult<()> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| SelectorError::Storage(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl StorageService for SledStorage {
    async fn get_item(&self, key: &str) -> SelectorResult<Option<String>> {
        let value = self
            .items
            .get(key.as_bytes())
            .map_err(|e| SelectorError::Storage(e.to_string()))?;

        value
            .map(|bytes| {
                String::from_utf8(bytes.to_vec()).map_err(|e| SelectorError::Deserialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    async fn set_item(&self, key: &str, value: &str) -> SelectorResult<()> {
        self.items
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| SelectorError::Storage(e.to_string()))?;
        self.flush()
    }

    async fn remove_item(&self, key: &str) -> SelectorResult<()> {
        self.items
            .remove(key.as_bytes())
            .map_err(|e| SelectorError::Storage(e.to_string()))?;
        self.flush()
    }
}

/// Open the backend named by the configuration
pub fn open_storage(config: &StorageConfig) -> SelectorResult<Arc<dyn StorageService>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::Sled => {
            std::fs::create_dir_all(&config.data_dir)?;
            Ok(Arc::new(SledStorage::open(&config.data_dir)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sled_storage_basic() {
        let tmp = TempDir::new().unwrap();
        let storage = SledStorage::open(tmp.path()).unwrap();

        storage.set_item("key1", "value1").await.unwrap();
        assert_eq!(storage.get_item("key1").await.unwrap(), Some("value1".to_string()));

        storage.remove_item("key1").await.unwrap();
        assert_eq!(storage.get_item("key1").await.unwrap(), None);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_sled_storage_reopen() {
        let tmp = TempDir::new().unwrap();

        // Write data
        {
            let storage = SledStorage::open(tmp.path()).unwrap();
            storage.set_item("near-wallet-selector:contracts", "[]").await.unwrap();
        }

        // Reopen and verify
        {
            let storage = SledStorage::open(tmp.path()).unwrap();
            assert_eq!(
                storage.get_item("near-wallet-selector:contracts").await.unwrap(),
                Some("[]".to_string())
            );
            assert_eq!(storage.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_open_storage_from_config() {
        let tmp = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sled,
            data_dir: tmp.path().join("db"),
        };

        let storage = open_storage(&config).unwrap();
        storage.set_item("k", "v").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), Some("v".to_string()));
        assert!(config.data_dir.exists());
    }
}
