//! Wallet selector reducer
//!
//! The only place state transitions happen. `reduce` is pure: it never
//! touches storage and never mutates the snapshot it is given. When an
//! action changes nothing the input `Arc` is returned as-is, so callers can
//! detect no-ops with `Arc::ptr_eq`.

use std::sync::Arc;
use tracing::debug;
use wallet_selector_core::{
    AccountState, AccountsChangedPayload, SetActiveAccountPayload, SetupWalletModulesPayload,
    StateSnapshot, WalletConnectedPayload, WalletDisconnectedPayload, WalletSelectorAction,
    WalletSelectorState,
};

/// Apply one action to a snapshot
pub fn reduce(state: &StateSnapshot, action: WalletSelectorAction) -> StateSnapshot {
    debug!(action = action.kind(), "Store action");

    match action {
        WalletSelectorAction::SetupWalletModules(payload) => setup_wallet_modules(payload),
        WalletSelectorAction::WalletConnected(payload) => wallet_connected(state, payload),
        WalletSelectorAction::WalletDisconnected(payload) => wallet_disconnected(state, payload),
        WalletSelectorAction::AccountsChanged(payload) => accounts_changed(state, payload),
        WalletSelectorAction::SetActiveAccount(payload) => set_active_account(state, payload),
        WalletSelectorAction::Unknown => Arc::clone(state),
    }
}

fn setup_wallet_modules(payload: SetupWalletModulesPayload) -> StateSnapshot {
    Arc::new(WalletSelectorState {
        modules: payload.modules.into(),
        accounts: activate(payload.accounts, |index, _| index == 0),
        selected_wallet_id: payload.selected_wallet_id,
        recently_signed_in_wallets: payload.recently_signed_in_wallets.into(),
        contracts: payload.contracts.into(),
    })
}

fn wallet_connected(state: &StateSnapshot, payload: WalletConnectedPayload) -> StateSnapshot {
    if payload.accounts.is_empty() {
        return Arc::clone(state);
    }

    // Keeps the active *position*, not the account id, across a reconnect.
    let active_index = state
        .active_account_index()
        .filter(|&index| index < payload.accounts.len())
        .unwrap_or(0);

    Arc::new(WalletSelectorState {
        modules: Arc::clone(&state.modules),
        accounts: activate(payload.accounts, |index, _| index == active_index),
        selected_wallet_id: Some(payload.wallet_id),
        recently_signed_in_wallets: payload.recently_signed_in_wallets.into(),
        contracts: payload.contracts.into(),
    })
}

fn wallet_disconnected(state: &StateSnapshot, payload: WalletDisconnectedPayload) -> StateSnapshot {
    if !is_selected(state, &payload.wallet_id) {
        return Arc::clone(state);
    }

    Arc::new(WalletSelectorState {
        modules: Arc::clone(&state.modules),
        accounts: Vec::new().into(),
        selected_wallet_id: None,
        recently_signed_in_wallets: Arc::clone(&state.recently_signed_in_wallets),
        contracts: Vec::new().into(),
    })
}

fn accounts_changed(state: &StateSnapshot, payload: AccountsChangedPayload) -> StateSnapshot {
    if !is_selected(state, &payload.wallet_id) {
        return Arc::clone(state);
    }

    let retained_id = state
        .active_account()
        .map(|account| account.account_id.clone())
        .filter(|id| payload.accounts.iter().any(|account| &account.account_id == id));

    let accounts = match retained_id {
        Some(id) => activate(payload.accounts, |_, account| account.account_id == id),
        None => activate(payload.accounts, |index, _| index == 0),
    };

    Arc::new(WalletSelectorState {
        accounts,
        ..WalletSelectorState::clone(state)
    })
}

/// An id matching no account leaves every account inactive.
fn set_active_account(state: &StateSnapshot, payload: SetActiveAccountPayload) -> StateSnapshot {
    let accounts: Vec<AccountState> = state
        .accounts
        .iter()
        .map(|account| account.with_active(account.account_id == payload.account_id))
        .collect();

    Arc::new(WalletSelectorState {
        accounts: accounts.into(),
        ..WalletSelectorState::clone(state)
    })
}

fn is_selected(state: &WalletSelectorState, wallet_id: &str) -> bool {
    state.selected_wallet_id.as_deref() == Some(wallet_id)
}

/// Rebuild `accounts` with `active` set only where the predicate holds
fn activate<F>(accounts: Vec<AccountState>, is_active: F) -> Arc<[AccountState]>
where
    F: Fn(usize, &AccountState) -> bool,
{
    accounts
        .into_iter()
        .enumerate()
        .map(|(index, mut account)| {
            account.active = is_active(index, &account);
            account
        })
        .collect::<Vec<_>>()
        .into()
}
