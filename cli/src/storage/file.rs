//! Storage region persisted as one JSON object file.
//!
//! The file is re-read on every operation, so edits made by another process
//! between calls are observed. There is no locking: two processes writing at
//! once can lose each other's updates.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::paths::storage_file;
use crate::error::Result;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{region_size, KeyValueStore};

type Region = BTreeMap<String, String>;

/// File-backed storage region.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileStore {
    /// Opens the region at the default data location.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined.
    pub fn new(quota_bytes: Option<u64>) -> Result<Self> {
        Ok(Self::at(storage_file()?, quota_bytes))
    }

    /// Opens the region stored in `path`. The file is created on first write.
    #[must_use]
    pub fn at(path: PathBuf, quota_bytes: Option<u64>) -> Self {
        Self { path, quota_bytes }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Region> {
        if !self.path.exists() {
            return Ok(Region::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Region::new());
        }

        serde_json::from_str(&contents).map_err(|e| StorageError::Corrupted(e.to_string()))
    }

    fn persist(&self, region: &Region) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(region)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut region = self.load()?;
        region.insert(key.to_string(), value.to_string());

        if let Some(limit) = self.quota_bytes {
            let needed = region_size(region.iter());
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        self.persist(&region)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut region = self.load()?;
        if region.remove(key).is_some() {
            self.persist(&region)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}
