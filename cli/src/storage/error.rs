//! Storage-region error types.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](super::KeyValueStore) backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write would push the region past its byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit} bytes.")]
    QuotaExceeded {
        /// Total bytes the region would occupy after the write.
        needed: u64,
        /// Configured quota.
        limit: u64,
    },

    /// The backing medium cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The region itself (not a single entry) could not be decoded.
    #[error("Storage region corrupted: {0}. Remove the file to start over.")]
    Corrupted(String),

    /// IO operation failed.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[allow(dead_code)]
impl StorageError {
    /// Checks if this error is a quota rejection.
    #[must_use]
    pub const fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Result type alias using [`StorageError`].
pub type StorageResult<T> = std::result::Result<T, StorageError>;
