//! File-backed storage backend.
//!
//! Each key is one file, `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory and are renamed into place, so a reader never sees a
//! half-written document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use super::{CasOutcome, KeyValueStore};
use crate::error::{Result, StorageError};

const MAX_KEY_LENGTH: usize = 128;
const VALUE_EXTENSION: &str = "json";

/// Directory-backed key-value store.
///
/// `compare_and_swap` is atomic with respect to other users of the same
/// `FileStore` value; separate processes sharing the directory are only
/// protected by the atomic rename.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self {
            dir,
            quota: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Refuse writes that would grow the stored documents beyond `quota`
    /// bytes in total.
    #[must_use]
    pub const fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }

    fn read_path(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn usage_excluding(&self, excluded: &Path) -> Result<usize> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == excluded || path.extension().is_none_or(|ext| ext != VALUE_EXTENSION) {
                continue;
            }
            let len = fs::metadata(&path)?.len();
            total += usize::try_from(len).unwrap_or(usize::MAX);
        }
        Ok(total)
    }

    fn write_path(&self, path: &Path, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.usage_excluding(path)? + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_path(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

/// Keys become file names, so only a conservative charset is accepted.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Self::read_path(&self.path_for(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _guard = self.lock()?;
        self.write_path(&path, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _guard = self.lock()?;
        Self::remove_path(&path)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<CasOutcome> {
        let path = self.path_for(key)?;
        let _guard = self.lock()?;

        let current = Self::read_path(&path)?;
        if current.as_deref() != expected {
            return Ok(CasOutcome::Conflict { current });
        }

        match new {
            Some(value) => self.write_path(&path, value)?,
            None => Self::remove_path(&path)?,
        }
        Ok(CasOutcome::Swapped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("dacsan-file-store-{}", Uuid::new_v4()));
        FileStore::open(dir).unwrap()
    }

    #[test]
    fn test_set_get_remove() {
        let store = temp_store();
        assert_eq!(store.get_item("shopping_cart").unwrap(), None);

        store.set_item("shopping_cart", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            store.get_item("shopping_cart").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );

        store.remove_item("shopping_cart").unwrap();
        store.remove_item("shopping_cart").unwrap();
        assert_eq!(store.get_item("shopping_cart").unwrap(), None);

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = temp_store();
        for key in ["", "../escape", ".hidden", "a/b", "spaced key"] {
            assert!(
                matches!(store.set_item(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_values_persist_across_instances() {
        let store = temp_store();
        store.set_item("k", "v").unwrap();

        let reopened = FileStore::open(store.dir()).unwrap();
        assert_eq!(reopened.get_item("k").unwrap().as_deref(), Some("v"));

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_quota() {
        let store = temp_store().with_quota(8);
        store.set_item("a", "12345").unwrap();
        assert!(matches!(
            store.set_item("b", "1234"),
            Err(StorageError::QuotaExceeded { needed: 9, quota: 8 })
        ));
        // Replacing a value only counts the new size.
        store.set_item("a", "12345678").unwrap();
        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_compare_and_swap_conflict() {
        let store = temp_store();
        store.set_item("k", "v1").unwrap();
        assert_eq!(
            store.compare_and_swap("k", Some("v0"), Some("v2")).unwrap(),
            CasOutcome::Conflict {
                current: Some("v1".to_string())
            }
        );
        assert_eq!(
            store.compare_and_swap("k", Some("v1"), Some("v2")).unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));
        fs::remove_dir_all(store.dir()).unwrap();
    }
}
