//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CasOutcome, KeyValueStore};
use crate::error::{Result, StorageError};

/// In-memory key-value store with an optional byte quota.
///
/// Usage is counted as the byte length of every key plus its value. A write
/// that would exceed the quota fails with [`StorageError::QuotaExceeded`]
/// and leaves the previous value in place.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes beyond `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Bytes currently used.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn usage(&self) -> Result<usize> {
        Ok(usage_of(&*self.read()?))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.entries
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.entries
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn check_quota(&self, entries: &HashMap<String, String>, key: &str, value: &str) -> Result<()> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let current_entry = entries.get(key).map_or(0, |old| key.len() + old.len());
        let needed = usage_of(entries) - current_entry + key.len() + value.len();
        if needed > quota {
            return Err(StorageError::QuotaExceeded { needed, quota });
        }
        Ok(())
    }
}

fn usage_of(entries: &HashMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.write()?;
        self.check_quota(&entries, key, value)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<CasOutcome> {
        let mut entries = self.write()?;
        let current = entries.get(key).map(String::as_str);
        if current != expected {
            return Ok(CasOutcome::Conflict {
                current: current.map(str::to_string),
            });
        }

        match new {
            Some(value) => {
                self.check_quota(&entries, key, value)?;
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(CasOutcome::Swapped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));

        store.remove_item("k").unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "12345").unwrap();

        let err = store.set_item("k", "1234567890").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("12345"));
        assert_eq!(store.usage().unwrap(), 6);
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "123456789").unwrap();
        store.set_item("k", "987654321").unwrap();
        assert_eq!(store.usage().unwrap(), 10);
    }

    #[test]
    fn test_compare_and_swap() {
        let store = MemoryStore::new();
        assert_eq!(
            store.compare_and_swap("k", None, Some("a")).unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(
            store.compare_and_swap("k", None, Some("b")).unwrap(),
            CasOutcome::Conflict {
                current: Some("a".to_string())
            }
        );
        assert_eq!(
            store.compare_and_swap("k", Some("a"), None).unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(store.get_item("k").unwrap(), None);
    }
}
