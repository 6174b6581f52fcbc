//! Local key-value storage.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the storage surface the cart store is written
//!   against: string keys, string values, synchronous calls.
//! - [`MemoryStore`] and [`FileStore`] are backends. Neither publishes change
//!   events on its own.
//! - A [`Partition`] wraps one backend and hands out [`BrowsingContext`]s.
//!   Every successful write through a context is published as a
//!   [`StorageEvent`] that the *other* contexts of the partition receive;
//!   the writer never sees its own events.

mod file;
mod memory;
mod partition;

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use partition::{BrowsingContext, Partition, StorageEvents};

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Absent keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error on quota exhaustion or backend failure.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Replace `key` with `new` (or delete it when `new` is `None`) only if
    /// its current value equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error on quota exhaustion or backend failure. A value
    /// mismatch is not an error; it is reported as [`CasOutcome::Conflict`].
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<CasOutcome>;
}

/// Result of [`KeyValueStore::compare_and_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The value matched and was replaced.
    Swapped,
    /// Someone else wrote first; this is what is stored now.
    Conflict { current: Option<String> },
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<CasOutcome> {
        (**self).compare_and_swap(key, expected, new)
    }
}

/// Identity of one browsing context (tab/window) in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Placeholder origin for events whose writer is not known.
    pub const UNKNOWN: Self = Self(Uuid::nil());

    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A storage-change notification.
///
/// `key` is `None` when every key may have changed (the receiver fell
/// behind and missed events), in which case observers should re-read
/// everything they care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: ContextId,
}

impl StorageEvent {
    /// Whether observers of `key` should react to this event.
    #[must_use]
    pub fn concerns(&self, key: &str) -> bool {
        self.key.as_deref().is_none_or(|k| k == key)
    }

    pub(crate) const fn resync() -> Self {
        Self {
            key: None,
            old_value: None,
            new_value: None,
            origin: ContextId::UNKNOWN,
        }
    }
}
