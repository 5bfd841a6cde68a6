//! Sync layer configuration.

use std::sync::Arc;

use cowork_store::origin::DEFAULT_CHANNEL_CAPACITY;
use cowork_store::{MemoryStore, Origin, StorageKeys};

use crate::error::{Result, SyncError};

/// Sync layer configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Storage key layout.
    pub keys: StorageKeys,

    /// How many change events a context may fall behind before losing some
    /// (default: 256).
    pub channel_capacity: usize,

    /// `RocksDB` data directory. `None` keeps everything in memory.
    pub data_dir: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            data_dir: None,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if a variable is present but invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StorageKeys::default();
        let key = |name: &str, default: String| lookup(name).unwrap_or(default);

        let keys = StorageKeys {
            bookings: key("COWORK_KEY_BOOKINGS", defaults.bookings),
            booking_new: key("COWORK_KEY_BOOKING_NEW", defaults.booking_new),
            memberships: key("COWORK_KEY_MEMBERSHIPS", defaults.memberships),
            membership_new: key("COWORK_KEY_MEMBERSHIP_NEW", defaults.membership_new),
            membership_update: key("COWORK_KEY_MEMBERSHIP_UPDATE", defaults.membership_update),
        };
        keys.validate()
            .map_err(|e| SyncError::Configuration(e.to_string()))?;

        let channel_capacity = match lookup("COWORK_CHANNEL_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(SyncError::Configuration(format!(
                        "COWORK_CHANNEL_CAPACITY must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => DEFAULT_CHANNEL_CAPACITY,
        };

        let data_dir = lookup("COWORK_DATA_DIR").filter(|dir| !dir.trim().is_empty());

        Ok(Self {
            keys,
            channel_capacity,
            data_dir,
        })
    }

    /// Open the origin this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key layout is invalid or the data directory
    /// cannot be opened.
    pub fn open_origin(&self) -> Result<Arc<Origin>> {
        self.keys.validate()?;

        if let Some(data_dir) = &self.data_dir {
            #[cfg(feature = "rocksdb-backend")]
            {
                tracing::info!(path = %data_dir, "Opening RocksDB store");
                let store = cowork_store::RocksStore::open(data_dir)?;
                return Ok(Origin::new(Arc::new(store), self.channel_capacity));
            }
            #[cfg(not(feature = "rocksdb-backend"))]
            tracing::warn!(
                path = %data_dir,
                "Data directory configured but rocksdb-backend is disabled; using memory store"
            );
        }

        tracing::info!(channel_capacity = self.channel_capacity, "Opening in-memory store");
        Ok(Origin::new(Arc::new(MemoryStore::new()), self.channel_capacity))
    }
}
