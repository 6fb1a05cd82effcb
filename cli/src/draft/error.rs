//! Draft-specific error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from draft operations that report why they failed.
#[derive(Error, Debug)]
pub enum DraftError {
    /// No user identity was supplied.
    #[error("A user id is required to access workout drafts.")]
    MissingUserId,

    /// The payload's day index is unusable and no earlier draft can supply one.
    #[error("Invalid day index {0}: expected a non-negative integer.")]
    InvalidDayIndex(String),

    /// The storage region rejected the operation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The draft could not be encoded.
    #[error("Draft serialization error: {0}")]
    Serialization(String),
}

#[allow(dead_code)]
impl DraftError {
    /// Checks if this error came from the caller's input rather than storage.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::MissingUserId | Self::InvalidDayIndex(_))
    }
}

impl From<serde_json::Error> for DraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
