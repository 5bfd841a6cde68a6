//! `RocksDB` storage implementation.
//!
//! This module provides the durable `RocksStore` implementation of the
//! `KeyValueStore` trait. Keys and values are stored as UTF-8 bytes in the
//! default column family.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{DBWithThreadMode, IteratorMode, MultiThreaded, Options};

use crate::error::{Result, StoreError};
use crate::KeyValueStore;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn decode(bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl KeyValueStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::decode(&data))
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .put(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db
            .delete(key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for item in self.db.iterator(IteratorMode::Start) {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            keys.push(Self::decode(&key)?);
        }
        Ok(keys)
    }
}
