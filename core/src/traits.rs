//! Core traits defining wallet selector interfaces

use async_trait::async_trait;

/// Result type for wallet selector operations
pub type SelectorResult<T> = Result<T, crate::error::SelectorError>;

/// Asynchronous string key-value storage
///
/// Implemented by whatever backend the host provides. Keys arrive already
/// namespaced, values already encoded.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Get a value by key
    async fn get_item(&self, key: &str) -> SelectorResult<Option<String>>;

    /// Set a value
    async fn set_item(&self, key: &str, value: &str) -> SelectorResult<()>;

    /// Delete a key
    async fn remove_item(&self, key: &str) -> SelectorResult<()>;
}
