//! Error types for storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The write would exceed the store's size limit.
    #[error("quota exceeded writing {key}: limit={limit_bytes} bytes")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// The configured limit in bytes.
        limit_bytes: usize,
    },

    /// The store cannot be used at all (disabled, poisoned, closed).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The storage key layout is unusable.
    #[error("invalid storage keys: {0}")]
    InvalidKeys(String),
}
