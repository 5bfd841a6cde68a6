//! Best-effort JSON collections.
//!
//! A collection is a JSON array stored under a single key. Reads never fail: a
//! missing key, unreadable storage, invalid JSON or a non-array value all read as
//! an empty collection. Writes never fail either: errors are logged and dropped,
//! so a full or disabled store cannot break the caller's flow.
//!
//! The `try_*` variants expose the underlying `Result` for callers that want it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::origin::Context;

/// Read the collection at `key`, propagating every failure.
///
/// A missing key is an empty collection. Array elements that do not decode as
/// `T` are skipped.
///
/// # Errors
///
/// Returns an error if storage cannot be read, the value is not valid JSON, or
/// the value is not an array.
pub fn try_read_collection<T: DeserializeOwned>(ctx: &Context, key: &str) -> Result<Vec<T>> {
    let Some(raw) = ctx.get_item(key)? else {
        return Ok(Vec::new());
    };

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let serde_json::Value::Array(items) = value else {
        return Err(StoreError::Serialization(format!(
            "expected array at {key}"
        )));
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if records.len() < total {
        tracing::debug!(
            key = %key,
            skipped = total - records.len(),
            "Skipped undecodable collection elements"
        );
    }

    Ok(records)
}

/// Read the collection at `key`, or an empty collection on any failure.
#[must_use]
pub fn read_collection<T: DeserializeOwned>(ctx: &Context, key: &str) -> Vec<T> {
    try_read_collection(ctx, key).unwrap_or_else(|e| {
        tracing::debug!(key = %key, error = %e, "Treating unreadable collection as empty");
        Vec::new()
    })
}

/// Serialize `records` as a JSON array and store it at `key`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn try_write_collection<T: Serialize>(ctx: &Context, key: &str, records: &[T]) -> Result<()> {
    let raw = serde_json::to_string(records).map_err(|e| StoreError::Serialization(e.to_string()))?;
    ctx.set_item(key, &raw)
}

/// Store `records` at `key`, logging and dropping any failure.
pub fn write_collection<T: Serialize>(ctx: &Context, key: &str, records: &[T]) {
    if let Err(e) = try_write_collection(ctx, key, records) {
        tracing::warn!(key = %key, error = %e, "Dropped collection write");
    }
}

/// Read a single JSON value at `key`, or `None` if missing or undecodable.
#[must_use]
pub fn read_value<T: DeserializeOwned>(ctx: &Context, key: &str) -> Option<T> {
    let raw = ctx.get_item(key).ok().flatten()?;
    serde_json::from_str(&raw)
        .map_err(|e| tracing::debug!(key = %key, error = %e, "Ignoring undecodable value"))
        .ok()
}

/// Store a single value as JSON at `key`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn try_write_value<T: Serialize>(ctx: &Context, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    ctx.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::origin::Origin;
    use crate::KeyValueStore;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
    }

    fn item(id: &str) -> Item {
        Item { id: id.into() }
    }

    #[test]
    fn missing_key_reads_empty() {
        let ctx = Origin::in_memory().context();
        assert!(read_collection::<Item>(&ctx, "items").is_empty());
        assert!(try_read_collection::<Item>(&ctx, "items").unwrap().is_empty());
    }

    #[test]
    fn write_then_read() {
        let ctx = Origin::in_memory().context();
        write_collection(&ctx, "items", &[item("a"), item("b")]);

        assert_eq!(ctx.get_item("items").unwrap().unwrap(), r#"[{"id":"a"},{"id":"b"}]"#);
        assert_eq!(read_collection::<Item>(&ctx, "items"), vec![item("a"), item("b")]);
    }

    #[test]
    fn corrupt_json_reads_empty() {
        let ctx = Origin::in_memory().context();
        ctx.set_item("items", "{not json").unwrap();

        assert!(read_collection::<Item>(&ctx, "items").is_empty());
        assert!(matches!(
            try_read_collection::<Item>(&ctx, "items"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn non_array_json_reads_empty() {
        let ctx = Origin::in_memory().context();
        for raw in [r#"{"id":"a"}"#, "42", "null", r#""text""#] {
            ctx.set_item("items", raw).unwrap();
            assert!(read_collection::<Item>(&ctx, "items").is_empty(), "{raw}");
        }
    }

    #[test]
    fn undecodable_elements_are_skipped() {
        let ctx = Origin::in_memory().context();
        ctx.set_item("items", r#"[{"id":"a"},{"nope":1},7,{"id":"b"}]"#)
            .unwrap();
        assert_eq!(read_collection::<Item>(&ctx, "items"), vec![item("a"), item("b")]);
    }

    #[test]
    fn unreadable_store_reads_empty() {
        let store = Arc::new(MemoryStore::new());
        let origin = Origin::new(store.clone(), 8);
        let ctx = origin.context();
        write_collection(&ctx, "items", &[item("a")]);

        store.set_offline(true);
        assert!(read_collection::<Item>(&ctx, "items").is_empty());
    }

    #[test]
    fn failed_write_is_swallowed() {
        let store = Arc::new(MemoryStore::with_quota(24));
        let origin = Origin::new(store.clone(), 8);
        let ctx = origin.context();

        write_collection(&ctx, "items", &[item("a")]);
        let before = store.get("items").unwrap();

        // Too large for the quota: no panic, no error, previous value intact.
        write_collection(&ctx, "items", &[item("a"), item("b"), item("c")]);
        assert_eq!(store.get("items").unwrap(), before);
        assert!(try_write_collection(&ctx, "items", &[item("a"), item("b")]).is_err());
    }

    #[test]
    fn single_values() {
        let ctx = Origin::in_memory().context();
        assert_eq!(read_value::<Item>(&ctx, "latest"), None);

        try_write_value(&ctx, "latest", &item("z")).unwrap();
        assert_eq!(read_value::<Item>(&ctx, "latest"), Some(item("z")));

        ctx.set_item("latest", "garbage").unwrap();
        assert_eq!(read_value::<Item>(&ctx, "latest"), None);
    }
}
