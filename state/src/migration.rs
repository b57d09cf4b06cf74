//! One-shot upgrade of the legacy single-contract record

use serde_json::Value;
use tracing::info;
use wallet_selector_core::keys::{CONTRACT, CONTRACTS};
use wallet_selector_core::SelectorResult;

use crate::json_storage::JsonStorage;

/// Move a stored `contract` into `contracts` as a one-element list.
///
/// Returns whether anything was migrated. The value is carried over as raw
/// JSON so an older record shape still migrates. A falsy record (`false`,
/// `0`, `""`) is left where it is. Must finish before the seed state is read.
pub async fn migrate_legacy_contract(storage: &JsonStorage) -> SelectorResult<bool> {
    let contract = match storage.get_item::<Value>(CONTRACT).await? {
        Some(contract) if is_truthy(&contract) => contract,
        _ => return Ok(false),
    };

    storage.set_item(CONTRACTS, &[contract]).await?;
    storage.remove_item(CONTRACT).await?;

    info!(namespace = storage.namespace(), "Migrated legacy contract state");

    Ok(true)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
