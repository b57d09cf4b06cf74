//! Error types for the wallet selector state core

use thiserror::Error;

/// Main error type for the wallet selector state core
#[derive(Error, Debug)]
pub enum SelectorError {
    // ============ Storage Errors ============
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Deserialization failed for key {key}: {reason}")]
    Deserialization { key: String, reason: String },

    // ============ Configuration Errors ============
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ General Errors ============
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for SelectorError {
    fn from(err: std::io::Error) -> Self {
        SelectorError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SelectorError {
    fn from(err: serde_json::Error) -> Self {
        SelectorError::Serialization(err.to_string())
    }
}
