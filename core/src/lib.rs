//! Wallet Selector Core Library
//!
//! State types, actions, error and storage abstractions shared by the
//! wallet selector store. Holds no behavior of its own beyond (de)serialization.

pub mod action;
pub mod config;
pub mod error;
pub mod keys;
pub mod traits;
pub mod types;

pub use action::*;
pub use config::*;
pub use error::*;
pub use traits::*;
pub use types::*;
