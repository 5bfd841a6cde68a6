//! Shared key-value storage for the coworking sync layer.
//!
//! This crate models the per-origin string store that every open tab of the site
//! shares, together with the change notifications the platform fires when one tab
//! writes a key.
//!
//! # Architecture
//!
//! - [`KeyValueStore`]: the raw backend (`MemoryStore`, or `RocksStore` with the
//!   `rocksdb-backend` feature)
//! - [`Origin`]: one backend plus a broadcast channel of [`StorageEvent`]s
//! - [`Context`]: a single tab's handle on the origin; its writes are announced to
//!   every *other* context, never to itself
//! - [`collection`]: best-effort JSON collections stored under one key
//!
//! # Example
//!
//! ```
//! use cowork_store::{collection, Origin};
//!
//! let origin = Origin::in_memory();
//! let tab_a = origin.context();
//! let tab_b = origin.context();
//! let mut listener = tab_b.listen();
//!
//! collection::write_collection(&tab_a, "bookings", &["b1"]);
//!
//! let event = listener.try_next().unwrap();
//! assert_eq!(event.key, "bookings");
//! assert_eq!(collection::read_collection::<String>(&tab_b, "bookings"), vec!["b1"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod error;
pub mod keys;
pub mod memory;
pub mod origin;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;

pub use error::{Result, StoreError};
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use origin::{Context, ContextId, Origin, StorageEvent, StorageListener};
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

/// The storage trait defining the raw string operations.
///
/// This trait abstracts the backend, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing). Implementations do not notify
/// anyone; change notification is layered on top by [`Origin`].
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::QuotaExceeded` if the backend is full, or another
    /// error if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// List all stored keys, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>>;
}
