//! Persisted storage keys
//!
//! All keys live under the store namespace, see [`crate::config::DEFAULT_NAMESPACE`].

pub const SELECTED_WALLET_ID: &str = "selectedWalletId";
pub const RECENTLY_SIGNED_IN_WALLETS: &str = "recentlySignedInWallets";
pub const CONTRACTS: &str = "contracts";

/// Pre-`contracts` single contract record, migrated on startup
pub const CONTRACT: &str = "contract";
