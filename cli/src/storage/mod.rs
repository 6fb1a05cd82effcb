//! Local key-value storage region.
//!
//! This module provides the flat string-to-string namespace drafts live in:
//! - [`KeyValueStore`] - Trait for storage region operations
//! - [`MemoryStore`] - Volatile in-process region
//! - [`FileStore`] - Region persisted as a single JSON file

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
#[allow(unused_imports)]
pub use memory::MemoryStore;

/// A flat namespace of string keys to string values.
///
/// Implementations are used from a single thread of control and take `&self`
/// for every operation.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Gets the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] if the region would grow past
    /// its quota, or another error if the region cannot be written.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be written.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Enumerates every key in the region.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be read.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Bytes a region occupies: every key and value, UTF-8 encoded.
pub(crate) fn region_size<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> u64 {
    entries
        .map(|(k, v)| (k.len() + v.len()) as u64)
        .sum()
}
