//! Core types for the wallet selector
//!
//! Defines the state snapshot shared by the store, its reducer and the
//! persistence layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Wallet module descriptor
///
/// Only `id` is interpreted by the store; everything else the module layer
/// attaches is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleState {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }
}

/// Account exposed by the selected wallet
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub account_id: String,
    /// Ignored on incoming payloads; the reducer decides which account is active
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountState {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            active: false,
            extra: Map::new(),
        }
    }

    /// Copy of this account with the given active flag
    pub fn with_active(&self, active: bool) -> Self {
        Self {
            active,
            ..self.clone()
        }
    }
}

impl fmt::Debug for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active {
            write!(f, "AccountState({}, active)", self.account_id)
        } else {
            write!(f, "AccountState({})", self.account_id)
        }
    }
}

/// Contract the session is scoped to
///
/// Opaque to the store. Older records use other field names, so every known
/// field is optional and absent fields are not written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContractState {
    pub fn new(contract_id: impl Into<String>) -> Self {
        Self {
            contract_id: Some(contract_id.into()),
            method_names: None,
            extra: Map::new(),
        }
    }
}

/// One immutable state snapshot
///
/// Sequences are reference counted so that a field left alone by an action
/// keeps the same allocation across snapshots. The persistence layer relies
/// on that: it compares sequences with `Arc::ptr_eq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSelectorState {
    pub modules: Arc<[ModuleState]>,
    pub accounts: Arc<[AccountState]>,
    pub selected_wallet_id: Option<String>,
    pub recently_signed_in_wallets: Arc<[String]>,
    pub contracts: Arc<[ContractState]>,
}

impl WalletSelectorState {
    /// Seed state as restored from storage: no modules, no accounts
    pub fn seeded(
        selected_wallet_id: Option<String>,
        recently_signed_in_wallets: Vec<String>,
        contracts: Vec<ContractState>,
    ) -> Self {
        Self {
            selected_wallet_id,
            recently_signed_in_wallets: recently_signed_in_wallets.into(),
            contracts: contracts.into(),
            ..Self::default()
        }
    }

    /// Position of the active account, if any
    pub fn active_account_index(&self) -> Option<usize> {
        self.accounts.iter().position(|account| account.active)
    }

    /// The active account, if any
    pub fn active_account(&self) -> Option<&AccountState> {
        self.accounts.iter().find(|account| account.active)
    }
}

impl Default for WalletSelectorState {
    fn default() -> Self {
        Self {
            modules: Vec::new().into(),
            accounts: Vec::new().into(),
            selected_wallet_id: None,
            recently_signed_in_wallets: Vec::new().into(),
            contracts: Vec::new().into(),
        }
    }
}

/// Shared handle to a snapshot
pub type StateSnapshot = Arc<WalletSelectorState>;
