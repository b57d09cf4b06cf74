//! Namespaced JSON view over a [`StorageService`]

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use wallet_selector_core::{SelectorError, SelectorResult, StorageService};

/// Stores JSON-encoded values under `"{namespace}:{key}"`
#[derive(Clone)]
pub struct JsonStorage {
    storage: Arc<dyn StorageService>,
    namespace: String,
}

impl JsonStorage {
    pub fn new(storage: Arc<dyn StorageService>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully qualified key as seen by the backend
    pub fn resolve_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Read and decode a value. A stored JSON `null` reads as absent.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> SelectorResult<Option<T>> {
        let resolved = self.resolve_key(key);
        let Some(raw) = self.storage.get_item(&resolved).await? else {
            return Ok(None);
        };

        serde_json::from_str::<Option<T>>(&raw).map_err(|e| SelectorError::Deserialization {
            key: resolved,
            reason: e.to_string(),
        })
    }

    pub async fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> SelectorResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.storage.set_item(&self.resolve_key(key), &encoded).await
    }

    pub async fn remove_item(&self, key: &str) -> SelectorResult<()> {
        self.storage.remove_item(&self.resolve_key(key)).await
    }
}
