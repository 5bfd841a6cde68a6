//! In-memory storage implementation.
//!
//! Used by tests and by single-process deployments that do not need durability.
//! An optional byte quota reproduces the "storage full" failures browsers raise,
//! and the store can be switched offline to simulate disabled storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::KeyValueStore;

/// `HashMap`-backed storage implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an unbounded in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once keys plus values exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total bytes currently stored (keys plus values).
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>())
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage is offline".into()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_online()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_online()?;
        let mut entries = self.entries.write().map_err(poisoned)?;

        if let Some(limit_bytes) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > limit_bytes {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    limit_bytes,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_online()?;
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_online()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}
