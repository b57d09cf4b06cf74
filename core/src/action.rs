//! Actions accepted by the wallet selector store

use serde::{Deserialize, Serialize};

use crate::types::{AccountState, ContractState, ModuleState};

/// Payload for [`WalletSelectorAction::SetupWalletModules`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupWalletModulesPayload {
    pub modules: Vec<ModuleState>,
    pub accounts: Vec<AccountState>,
    pub selected_wallet_id: Option<String>,
    pub recently_signed_in_wallets: Vec<String>,
    pub contracts: Vec<ContractState>,
}

/// Payload for [`WalletSelectorAction::WalletConnected`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectedPayload {
    pub wallet_id: String,
    pub accounts: Vec<AccountState>,
    pub recently_signed_in_wallets: Vec<String>,
    pub contracts: Vec<ContractState>,
}

/// Payload for [`WalletSelectorAction::WalletDisconnected`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDisconnectedPayload {
    pub wallet_id: String,
}

/// Payload for [`WalletSelectorAction::AccountsChanged`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsChangedPayload {
    pub wallet_id: String,
    pub accounts: Vec<AccountState>,
}

/// Payload for [`WalletSelectorAction::SetActiveAccount`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveAccountPayload {
    pub account_id: String,
}

/// State transition request
///
/// Encoded as `{"type": "WALLET_CONNECTED", "payload": {...}}`. Any tag not
/// listed here decodes to [`WalletSelectorAction::Unknown`], which the
/// reducer ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletSelectorAction {
    SetupWalletModules(SetupWalletModulesPayload),
    WalletConnected(WalletConnectedPayload),
    WalletDisconnected(WalletDisconnectedPayload),
    AccountsChanged(AccountsChangedPayload),
    SetActiveAccount(SetActiveAccountPayload),
    #[serde(other)]
    Unknown,
}

impl WalletSelectorAction {
    /// Wire tag of this action
    pub fn kind(&self) -> &'static str {
        match self {
            WalletSelectorAction::SetupWalletModules(_) => "SETUP_WALLET_MODULES",
            WalletSelectorAction::WalletConnected(_) => "WALLET_CONNECTED",
            WalletSelectorAction::WalletDisconnected(_) => "WALLET_DISCONNECTED",
            WalletSelectorAction::AccountsChanged(_) => "ACCOUNTS_CHANGED",
            WalletSelectorAction::SetActiveAccount(_) => "SET_ACTIVE_ACCOUNT",
            WalletSelectorAction::Unknown => "UNKNOWN",
        }
    }
}
