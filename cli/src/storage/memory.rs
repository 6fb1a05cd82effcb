//! Volatile in-process storage region.

use std::cell::RefCell;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{region_size, KeyValueStore};

/// In-memory region that enumerates keys in insertion order.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MemoryStore {
    entries: RefCell<Vec<(String, String)>>,
    quota_bytes: Option<u64>,
}

#[allow(dead_code)]
impl MemoryStore {
    /// Creates an empty, unbounded region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the region at `quota_bytes`.
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the region holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.borrow_mut();

        if let Some(limit) = self.quota_bytes {
            let others = region_size(
                entries
                    .iter()
                    .filter(|(k, _)| k != key)
                    .map(|(k, v)| (k, v)),
            );
            let needed = others + (key.len() + value.len()) as u64;
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        if let Some(slot) = entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            entries.push((key.to_string(), value.to_string()));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().retain(|(k, _)| k != key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_value() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();

        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn overwrite_keeps_position() {
        let store = MemoryStore::new();
        store.set("first", "1").unwrap();
        store.set("second", "2").unwrap();
        store.set("first", "3").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["first", "second"]);
        assert_eq!(store.get("first").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.remove("b").unwrap();
        store.remove("a").unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let store = MemoryStore::new().with_quota(10);
        store.set("key", "value").unwrap();

        let err = store.set("other", "too long").unwrap_err();
        assert!(err.is_quota());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let store = MemoryStore::new().with_quota(8);
        store.set("key", "12345").unwrap();
        store.set("key", "54321").unwrap();

        assert_eq!(store.get("key").unwrap(), Some("54321".to_string()));
    }
}
