//! Storage partitions and browsing contexts.
//!
//! A partition is what a browser profile's local storage is for one origin:
//! one backend shared by every open tab. Each tab gets a [`BrowsingContext`]
//! that reads and writes the shared backend and announces its writes to the
//! other tabs.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{CasOutcome, ContextId, KeyValueStore, MemoryStore, StorageEvent};
use crate::error::Result;

/// Events buffered per receiver before a slow context starts lagging.
const EVENT_CAPACITY: usize = 256;

/// One shared storage backend plus its change-event bus.
#[derive(Clone)]
pub struct Partition {
    backend: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<StorageEvent>,
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Partition {
    /// Create a partition over `backend`.
    #[must_use]
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend: Arc::new(backend),
            events,
        }
    }

    /// A partition over a fresh unbounded [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open a new browsing context on this partition.
    #[must_use]
    pub fn open_context(&self) -> BrowsingContext {
        let id = ContextId::generate();
        debug!(context = %id, "Opened browsing context");
        BrowsingContext {
            id,
            backend: Arc::clone(&self.backend),
            events: self.events.clone(),
        }
    }
}

/// One tab/window's handle on a partition.
#[derive(Clone)]
pub struct BrowsingContext {
    id: ContextId,
    backend: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<StorageEvent>,
}

impl std::fmt::Debug for BrowsingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowsingContext")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl BrowsingContext {
    /// This context's identity.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Subscribe to writes made by the *other* contexts of the partition.
    ///
    /// Only writes made after this call are delivered.
    #[must_use]
    pub fn storage_events(&self) -> StorageEvents {
        StorageEvents {
            own: self.id,
            rx: self.events.subscribe(),
        }
    }

    fn publish(&self, key: &str, old_value: Option<String>, new_value: Option<String>) {
        if old_value == new_value {
            return;
        }
        // No receivers just means no other tab is listening.
        let _ = self.events.send(StorageEvent {
            key: Some(key.to_string()),
            old_value,
            new_value,
            origin: self.id,
        });
    }
}

impl KeyValueStore for BrowsingContext {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.backend.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let old_value = self.backend.get_item(key)?;
        self.backend.set_item(key, value)?;
        self.publish(key, old_value, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let old_value = self.backend.get_item(key)?;
        self.backend.remove_item(key)?;
        self.publish(key, old_value, None);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<CasOutcome> {
        let outcome = self.backend.compare_and_swap(key, expected, new)?;
        if outcome == CasOutcome::Swapped {
            self.publish(key, expected.map(str::to_string), new.map(str::to_string));
        }
        Ok(outcome)
    }
}

/// Receiver of storage-change events from other contexts.
#[derive(Debug)]
pub struct StorageEvents {
    own: ContextId,
    rx: broadcast::Receiver<StorageEvent>,
}

impl StorageEvents {
    /// Wait for the next event from another context.
    ///
    /// Returns `None` once every context of the partition has been dropped.
    /// If this receiver fell behind, a key-less resync event is returned in
    /// place of the missed ones.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.own => {}
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Storage event receiver lagged, requesting resync");
                    return Some(StorageEvent::resync());
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending event without waiting.
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin == self.own => {}
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Storage event receiver lagged, requesting resync");
                    return Some(StorageEvent::resync());
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_does_not_see_own_events() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();
        let mut events_a = tab_a.storage_events();
        let mut events_b = tab_b.storage_events();

        tab_a.set_item("shopping_cart", "v1").unwrap();

        assert!(events_a.try_recv().is_none());
        let event = events_b.try_recv().unwrap();
        assert_eq!(event.key.as_deref(), Some("shopping_cart"));
        assert_eq!(event.old_value, None);
        assert_eq!(event.new_value.as_deref(), Some("v1"));
        assert_eq!(event.origin, tab_a.id());
    }

    #[test]
    fn test_contexts_share_backend() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();

        tab_a.set_item("k", "v").unwrap();
        assert_eq!(tab_b.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_remove_publishes_old_value() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();
        tab_a.set_item("k", "v").unwrap();

        let mut events_b = tab_b.storage_events();
        tab_a.remove_item("k").unwrap();

        let event = events_b.try_recv().unwrap();
        assert_eq!(event.old_value.as_deref(), Some("v"));
        assert_eq!(event.new_value, None);
    }

    #[test]
    fn test_unchanged_write_is_silent() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();
        tab_a.set_item("k", "v").unwrap();

        let mut events_b = tab_b.storage_events();
        tab_a.set_item("k", "v").unwrap();
        assert!(events_b.try_recv().is_none());
    }

    #[test]
    fn test_failed_cas_is_silent() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();
        tab_a.set_item("k", "v1").unwrap();

        let mut events_b = tab_b.storage_events();
        let outcome = tab_a.compare_and_swap("k", Some("stale"), Some("v2")).unwrap();
        assert!(matches!(outcome, CasOutcome::Conflict { .. }));
        assert!(events_b.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_waits_for_other_context() {
        let partition = Partition::in_memory();
        let tab_a = partition.open_context();
        let tab_b = partition.open_context();
        let mut events_b = tab_b.storage_events();

        let writer = tokio::spawn(async move {
            tab_a.set_item("k", "v").unwrap();
        });

        let event = events_b.recv().await.unwrap();
        assert_eq!(event.new_value.as_deref(), Some("v"));
        writer.await.unwrap();
    }
}
