//! Storage error types.
//!
//! None of these are fatal to a page: the cart store logs them and carries
//! on with its in-memory result.

use thiserror::Error;

/// Errors raised by key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would push the partition over its byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the partition would hold after the write.
        needed: usize,
        /// Configured quota.
        quota: usize,
    },

    /// The key cannot be stored by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is unusable (e.g. a poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for `StorageError`.
pub type Result<T> = std::result::Result<T, StorageError>;
