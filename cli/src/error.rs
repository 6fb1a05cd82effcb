//! Error types and result aliases for liftlog.
//!
//! This module provides the application-level error type:
//! - Specific variants for configuration, storage and draft failures
//! - User-friendly messages with recovery suggestions
//! - Automatic conversion from module and serialization errors

use thiserror::Error;

use crate::draft::DraftError;
use crate::storage::StorageError;

/// Main error type for liftlog operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// Failed to write configuration file.
    #[error("Failed to write configuration file: {0}. Check directory permissions.")]
    ConfigWrite(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("Data serialization error: {0}. This may indicate corrupted data.")]
    Serialization(String),

    /// Command-line input could not be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A draft for another workout is already in progress.
    #[error("A draft for '{existing}' is already in progress. Finish or clear it first, or pass --force to replace it.")]
    DraftConflict {
        /// Label of the draft in the way.
        existing: String,
    },

    /// Storage region error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Draft operation error.
    #[error(transparent)]
    Draft(#[from] DraftError),
}

impl AppError {
    /// Checks if the user can resolve this error by changing their input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::DraftConflict { .. })
    }
}

/// Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigRead(format!("TOML parse error: {err}"))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigWrite(format!("TOML serialize error: {err}"))
    }
}
