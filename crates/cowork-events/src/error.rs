//! Error types for the sync layer.
//!
//! Only setup can fail. Once a [`Tab`](crate::Tab) is open, every operation is
//! best-effort and reports nothing but a missing record.

use cowork_store::StoreError;

/// Result type for sync setup.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while configuring the sync layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backing store could not be opened.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
