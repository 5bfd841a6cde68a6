//! Error types for the core crate.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when parsing or validating core values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Unknown membership status tag.
    #[error("invalid membership status: {0}")]
    InvalidStatus(String),

    /// Unknown billing cycle tag.
    #[error("invalid billing cycle: {0}")]
    InvalidBillingCycle(String),

    /// Unknown plan type tag.
    #[error("invalid plan type: {0}")]
    InvalidPlanType(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
