//! Wallet selector store
//!
//! Owns the current snapshot, runs dispatched actions through the reducer
//! and fans every resulting snapshot out to subscribers and to the
//! persistence synchronizer.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info};
use wallet_selector_core::keys::{CONTRACTS, RECENTLY_SIGNED_IN_WALLETS, SELECTED_WALLET_ID};
use wallet_selector_core::{
    ContractState, SelectorResult, StateSnapshot, StorageService, StoreConfig,
    WalletSelectorAction, WalletSelectorState,
};

use crate::json_storage::JsonStorage;
use crate::migration::migrate_legacy_contract;
use crate::reducer::reduce;
use crate::sync::PersistenceSync;

struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<StateSnapshot>,
}

struct StoreInner {
    state: RwLock<StateSnapshot>,
    subscribers: Mutex<Vec<Subscriber>>,
    /// Serializes reduce + broadcast so every subscriber sees production order
    dispatch_lock: Mutex<()>,
    next_subscriber_id: AtomicU64,
    sync: PersistenceSync,
}

impl StoreInner {
    fn get_state(&self) -> StateSnapshot {
        Arc::clone(&self.state.read())
    }

    fn subscribe(self: &Arc<Self>) -> StateSubscription {
        let _guard = self.dispatch_lock.lock();

        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        // Replay the latest snapshot before anything newer can be sent.
        let _ = tx.send(self.get_state());
        self.subscribers.lock().push(Subscriber { id, tx });

        StateSubscription {
            id,
            rx,
            store: Arc::downgrade(self),
        }
    }

    fn broadcast(&self, snapshot: &StateSnapshot) {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.tx.send(Arc::clone(snapshot)).is_ok());

        let pruned = before - subscribers.len();
        if pruned > 0 {
            debug!(pruned, "Dropped closed state subscriptions");
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|subscriber| subscriber.id != id);
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|subscriber| !subscriber.tx.is_closed())
            .count()
    }
}

/// Read-write handle to the store. Cloning shares the same state.
#[derive(Clone)]
pub struct WalletSelectorStore {
    inner: Arc<StoreInner>,
}

impl WalletSelectorStore {
    /// Build a store seeded from persisted state.
    ///
    /// Runs the legacy contract migration, then reads the persisted
    /// `selectedWalletId`, `recentlySignedInWallets` and `contracts`. Any
    /// storage error aborts construction. Must be called within a Tokio
    /// runtime, which the persistence writer is spawned onto; outside one
    /// this returns an error.
    pub async fn create(
        storage: Arc<dyn StorageService>,
        config: &StoreConfig,
    ) -> SelectorResult<Self> {
        let storage = JsonStorage::new(storage, config.namespace.clone());

        let migrated = migrate_legacy_contract(&storage).await?;

        let selected_wallet_id: Option<String> = storage.get_item(SELECTED_WALLET_ID).await?;
        let recently_signed_in_wallets: Vec<String> = storage
            .get_item(RECENTLY_SIGNED_IN_WALLETS)
            .await?
            .unwrap_or_default();
        let contracts: Vec<ContractState> = storage.get_item(CONTRACTS).await?.unwrap_or_default();

        info!(
            namespace = %config.namespace,
            selected_wallet_id = ?selected_wallet_id,
            contracts = contracts.len(),
            migrated,
            "Wallet selector store created"
        );

        let initial = WalletSelectorState::seeded(
            selected_wallet_id,
            recently_signed_in_wallets,
            contracts,
        );

        let sync = PersistenceSync::spawn(storage)?;
        Ok(Self::with_state(Arc::new(initial), sync))
    }

    fn with_state(initial: StateSnapshot, sync: PersistenceSync) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                subscribers: Mutex::new(Vec::new()),
                dispatch_lock: Mutex::new(()),
                next_subscriber_id: AtomicU64::new(0),
                sync,
            }),
        }
    }

    /// Reduce an action against the latest snapshot and publish the result.
    ///
    /// Returns once every subscriber has been handed the new snapshot;
    /// storage writes it triggers complete later.
    pub fn dispatch(&self, action: WalletSelectorAction) {
        let inner = &self.inner;
        let _guard = inner.dispatch_lock.lock();

        let prev = inner.get_state();
        let next = reduce(&prev, action);
        *inner.state.write() = Arc::clone(&next);

        inner.sync.observe(&prev, &next);
        inner.broadcast(&next);
    }

    /// Latest snapshot
    pub fn get_state(&self) -> StateSnapshot {
        self.inner.get_state()
    }

    /// Current snapshot first, then every later one in dispatch order
    pub fn subscribe(&self) -> StateSubscription {
        self.inner.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// View without `dispatch`
    pub fn to_read_only(&self) -> ReadOnlyStore {
        ReadOnlyStore {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Wait for storage writes queued so far to finish
    pub async fn flush(&self) {
        self.inner.sync.flush().await
    }

    /// Storage writes that have failed since creation
    pub fn failed_writes(&self) -> u64 {
        self.inner.sync.failed_writes()
    }
}

/// Store handle for consumers that must not mutate state
#[derive(Clone)]
pub struct ReadOnlyStore {
    inner: Arc<StoreInner>,
}

impl ReadOnlyStore {
    pub fn get_state(&self) -> StateSnapshot {
        self.inner.get_state()
    }

    pub fn subscribe(&self) -> StateSubscription {
        self.inner.subscribe()
    }
}

/// Ordered stream of snapshots. Dropping it cancels delivery.
pub struct StateSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<StateSnapshot>,
    store: Weak<StoreInner>,
}

impl StateSubscription {
    /// Next snapshot, waiting if none is pending. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<StateSnapshot> {
        self.rx.recv().await
    }

    /// Next snapshot if one is already pending
    pub fn try_next(&mut self) -> Option<StateSnapshot> {
        self.rx.try_recv().ok()
    }

    /// Stop delivery now instead of at the next broadcast
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}
