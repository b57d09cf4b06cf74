//! Wallet Selector State Management
//!
//! Reactive store for the wallet selector: a pure reducer over a closed set
//! of actions, a store that broadcasts every snapshot to subscribers, and a
//! synchronizer that mirrors selected fields into namespaced storage.

pub mod json_storage;
pub mod memory;
pub mod migration;
pub mod persistent;
pub mod reducer;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use json_storage::*;
pub use memory::*;
pub use migration::*;
pub use persistent::*;
pub use reducer::*;
pub use store::*;
pub use sync::*;
