//! Storage test double that records every call

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use wallet_selector_core::{SelectorError, SelectorResult, StorageService};

use crate::memory::MemoryStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Set { key: String, value: String },
    Remove { key: String },
}

/// Memory storage that logs reads and writes, optionally failing them
pub struct RecordingStorage {
    inner: MemoryStorage,
    reads: Mutex<Vec<String>>,
    writes: Mutex<Vec<StorageOp>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::with_inner(MemoryStorage::new(), false, false)
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::with_inner(MemoryStorage::new(), true, true)
    }

    /// Reads succeed, writes and removes fail
    pub fn failing_writes() -> Self {
        Self::with_inner(MemoryStorage::new(), false, true)
    }

    fn with_inner(inner: MemoryStorage, fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fail_reads,
            fail_writes,
        }
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }

    pub fn writes(&self) -> Vec<StorageOp> {
        self.writes.lock().clone()
    }

    /// Writes touching one key, in the order they were applied
    pub fn writes_for(&self, key: &str) -> Vec<StorageOp> {
        self.writes
            .lock()
            .iter()
            .filter(|op| match op {
                StorageOp::Set { key: k, .. } | StorageOp::Remove { key: k } => k == key,
            })
            .cloned()
            .collect()
    }

    pub fn clear_log(&self) {
        self.reads.lock().clear();
        self.writes.lock().clear();
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.get_raw(key)
    }
}

#[async_trait]
impl StorageService for RecordingStorage {
    async fn get_item(&self, key: &str) -> SelectorResult<Option<String>> {
        self.reads.lock().push(key.to_string());
        if self.fail_reads {
            return Err(SelectorError::Storage(format!("read of {} refused", key)));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> SelectorResult<()> {
        self.writes.lock().push(StorageOp::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
        if self.fail_writes {
            return Err(SelectorError::Storage(format!("write of {} refused", key)));
        }
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> SelectorResult<()> {
        self.writes.lock().push(StorageOp::Remove {
            key: key.to_string(),
        });
        if self.fail_writes {
            return Err(SelectorError::Storage(format!("remove of {} refused", key)));
        }
        self.inner.remove_item(key).await
    }
}

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
