//! In-memory storage backend for testing and ephemeral sessions

use async_trait::async_trait;
use dashmap::DashMap;
use wallet_selector_core::{SelectorResult, StorageService};

/// In-memory key-value storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    pub fn with_data<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        for (key, value) in data {
            storage.data.insert(key.into(), value.into());
        }
        storage
    }

    /// Raw value without going through the async interface
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|v| v.value().clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Sorted list of stored keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    async fn get_item(&self, key: &str) -> SelectorResult<Option<String>> {
        Ok(self.get_raw(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> SelectorResult<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> SelectorResult<()> {
        self.data.remove(key);
        Ok(())
    }
}
