//! Error types for ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed or the store is unavailable.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An existence guard on an atomic multi-write was violated.
    #[error("write condition failed")]
    ConditionFailed,

    /// An idempotency guard conflict with no recoverable prior transaction.
    #[error("duplicate request: {token}")]
    DuplicateRequest {
        /// The idempotency token that was already claimed.
        token: String,
    },

    /// A pagination cursor could not be decoded.
    #[error("invalid pagination cursor")]
    InvalidCursor,
}
