//! Persistence synchronizer
//!
//! Mirrors `selectedWalletId`, `recentlySignedInWallets` and `contracts`
//! into storage. Each snapshot transition is diffed field by field; only
//! fields that changed produce a storage operation. Operations run on a
//! single background task in the order snapshots were produced, so the
//! dispatch path never waits on storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};
use wallet_selector_core::keys::{CONTRACTS, RECENTLY_SIGNED_IN_WALLETS, SELECTED_WALLET_ID};
use wallet_selector_core::{ContractState, SelectorError, SelectorResult, WalletSelectorState};

use crate::json_storage::JsonStorage;

/// One pending storage write
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOp {
    SetSelectedWalletId(String),
    SetRecentlySignedInWallets(Arc<[String]>),
    SetContracts(Arc<[ContractState]>),
    Remove(&'static str),
}

impl PersistOp {
    /// Unqualified storage key this operation touches
    pub fn key(&self) -> &'static str {
        match self {
            PersistOp::SetSelectedWalletId(_) => SELECTED_WALLET_ID,
            PersistOp::SetRecentlySignedInWallets(_) => RECENTLY_SIGNED_IN_WALLETS,
            PersistOp::SetContracts(_) => CONTRACTS,
            PersistOp::Remove(key) => *key,
        }
    }

    async fn apply(&self, storage: &JsonStorage) -> SelectorResult<()> {
        match self {
            PersistOp::SetSelectedWalletId(id) => storage.set_item(SELECTED_WALLET_ID, id).await,
            PersistOp::SetRecentlySignedInWallets(wallets) => {
                storage.set_item(RECENTLY_SIGNED_IN_WALLETS, &wallets[..]).await
            }
            PersistOp::SetContracts(contracts) => {
                storage.set_item(CONTRACTS, &contracts[..]).await
            }
            PersistOp::Remove(key) => storage.remove_item(key).await,
        }
    }
}

/// Storage operations needed to go from `prev` to `next`.
///
/// `selectedWalletId` is compared by value. The two sequences are compared
/// by allocation: a rebuilt sequence with identical contents still counts as
/// changed, a shared one never does. A changed field that is empty is
/// removed rather than written.
pub fn diff(prev: &WalletSelectorState, next: &WalletSelectorState) -> Vec<PersistOp> {
    let mut ops = Vec::new();

    if prev.selected_wallet_id != next.selected_wallet_id {
        ops.push(match next.selected_wallet_id.as_deref() {
            Some(id) if !id.is_empty() => PersistOp::SetSelectedWalletId(id.to_string()),
            _ => PersistOp::Remove(SELECTED_WALLET_ID),
        });
    }

    if !Arc::ptr_eq(&prev.recently_signed_in_wallets, &next.recently_signed_in_wallets) {
        ops.push(if next.recently_signed_in_wallets.is_empty() {
            PersistOp::Remove(RECENTLY_SIGNED_IN_WALLETS)
        } else {
            PersistOp::SetRecentlySignedInWallets(Arc::clone(&next.recently_signed_in_wallets))
        });
    }

    if !Arc::ptr_eq(&prev.contracts, &next.contracts) {
        ops.push(if next.contracts.is_empty() {
            PersistOp::Remove(CONTRACTS)
        } else {
            PersistOp::SetContracts(Arc::clone(&next.contracts))
        });
    }

    ops
}

/// Handle to the background writer
pub struct PersistenceSync {
    tx: mpsc::UnboundedSender<Vec<PersistOp>>,
    enqueued: AtomicU64,
    completed: watch::Receiver<u64>,
    failed: Arc<AtomicU64>,
}

impl PersistenceSync {
    /// Start the writer task on the current Tokio runtime
    pub fn spawn(storage: JsonStorage) -> SelectorResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            SelectorError::Internal(format!("persistence writer needs a Tokio runtime: {}", e))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (completed_tx, completed_rx) = watch::channel(0u64);
        let failed = Arc::new(AtomicU64::new(0));

        runtime.spawn(run_writer(storage, rx, completed_tx, failed.clone()));

        Ok(Self {
            tx,
            enqueued: AtomicU64::new(0),
            completed: completed_rx,
            failed,
        })
    }

    /// Queue whatever writes the transition requires. Never blocks.
    pub fn observe(&self, prev: &WalletSelectorState, next: &WalletSelectorState) {
        let ops = diff(prev, next);
        if ops.is_empty() {
            return;
        }

        self.enqueued.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(ops).is_err() {
            warn!("Persistence writer has stopped, dropping storage update");
            self.completed_externally();
        }
    }

    /// Wait until every batch queued so far has been applied or has failed
    pub async fn flush(&self) {
        let target = self.enqueued.load(Ordering::SeqCst);
        let mut completed = self.completed.clone();
        let _ = completed.wait_for(|done| *done >= target).await;
    }

    /// Number of storage operations that returned an error
    pub fn failed_writes(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    fn completed_externally(&self) {
        // Keep flush() from waiting on a batch nobody will run.
        self.enqueued.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_writer(
    storage: JsonStorage,
    mut rx: mpsc::UnboundedReceiver<Vec<PersistOp>>,
    completed: watch::Sender<u64>,
    failed: Arc<AtomicU64>,
) {
    while let Some(ops) = rx.recv().await {
        for op in &ops {
            match op.apply(&storage).await {
                Ok(()) => debug!(key = op.key(), "Persisted state field"),
                Err(e) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    warn!(key = op.key(), error = %e, "Failed to persist state field");
                }
            }
        }
        completed.send_modify(|done| *done += 1);
    }

    debug!("Persistence writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingStorage, StorageOp};
    use wallet_selector_core::AccountState;

    fn base() -> WalletSelectorState {
        WalletSelectorState::seeded(
            Some("walletA".to_string()),
            vec!["walletA".to_string()],
            vec![ContractState::new("c1")],
        )
    }

    #[test]
    fn test_identical_snapshot_has_no_ops() {
        let state = base();
        assert!(diff(&state, &state.clone()).is_empty());
    }

    #[test]
    fn test_cleared_wallet_id_is_removed() {
        let prev = base();
        let next = WalletSelectorState {
            selected_wallet_id: None,
            ..prev.clone()
        };

        assert_eq!(diff(&prev, &next), vec![PersistOp::Remove(SELECTED_WALLET_ID)]);
    }

    #[test]
    fn test_changed_wallet_id_is_written() {
        let prev = base();
        let next = WalletSelectorState {
            selected_wallet_id: Some("walletB".to_string()),
            ..prev.clone()
        };

        assert_eq!(
            diff(&prev, &next),
            vec![PersistOp::SetSelectedWalletId("walletB".to_string())]
        );
    }

    #[test]
    fn test_rebuilt_sequence_with_same_contents_counts_as_changed() {
        let prev = base();
        let next = WalletSelectorState {
            contracts: prev.contracts.to_vec().into(),
            ..prev.clone()
        };

        assert_eq!(diff(&prev, &next), vec![PersistOp::SetContracts(next.contracts.clone())]);
    }

    #[test]
    fn test_emptied_sequences_are_removed() {
        let prev = base();
        let next = WalletSelectorState {
            recently_signed_in_wallets: Vec::new().into(),
            contracts: Vec::new().into(),
            ..prev.clone()
        };

        assert_eq!(
            diff(&prev, &next),
            vec![
                PersistOp::Remove(RECENTLY_SIGNED_IN_WALLETS),
                PersistOp::Remove(CONTRACTS)
            ]
        );
    }

    #[test]
    fn test_untracked_fields_are_ignored() {
        let prev = base();
        let next = WalletSelectorState {
            accounts: vec![AccountState::new("a1").with_active(true)].into(),
            ..prev.clone()
        };

        assert!(diff(&prev, &next).is_empty());
    }

    #[tokio::test]
    async fn test_writer_applies_batches_in_order() {
        let backend = Arc::new(RecordingStorage::new());
        let sync = PersistenceSync::spawn(JsonStorage::new(backend.clone(), "ns")).unwrap();

        let first = base();
        let second = WalletSelectorState {
            selected_wallet_id: Some("walletB".to_string()),
            ..first.clone()
        };
        let third = WalletSelectorState {
            selected_wallet_id: None,
            ..second.clone()
        };

        sync.observe(&first, &second);
        sync.observe(&second, &third);
        sync.flush().await;

        assert_eq!(
            backend.writes_for("ns:selectedWalletId"),
            vec![
                StorageOp::Set {
                    key: "ns:selectedWalletId".to_string(),
                    value: "\"walletB\"".to_string(),
                },
                StorageOp::Remove {
                    key: "ns:selectedWalletId".to_string(),
                },
            ]
        );
        assert_eq!(backend.get_raw("ns:selectedWalletId"), None);
    }

    #[tokio::test]
    async fn test_failed_writes_are_counted() {
        let backend = Arc::new(RecordingStorage::failing_writes());
        let sync = PersistenceSync::spawn(JsonStorage::new(backend.clone(), "ns")).unwrap();

        let prev = base();
        let next = WalletSelectorState {
            recently_signed_in_wallets: Vec::new().into(),
            contracts: Vec::new().into(),
            ..prev.clone()
        };
        sync.observe(&prev, &next);
        sync.flush().await;

        assert_eq!(sync.failed_writes(), 2);
        assert_eq!(backend.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_flush_without_writes_returns() {
        let storage = JsonStorage::new(Arc::new(RecordingStorage::new()), "ns");
        let sync = PersistenceSync::spawn(storage).unwrap();
        sync.flush().await;
        assert_eq!(sync.failed_writes(), 0);
    }

    #[test]
    fn test_spawn_outside_runtime_is_an_error() {
        let storage = JsonStorage::new(Arc::new(RecordingStorage::new()), "ns");
        let result = PersistenceSync::spawn(storage);
        assert!(matches!(result, Err(SelectorError::Internal(_))));
    }
}
