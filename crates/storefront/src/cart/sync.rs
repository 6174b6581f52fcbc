//! Keeps cart observers current within one browsing context.
//!
//! Observers are re-rendered from a fresh [`CartStore::get_cart`] read
//! whenever:
//! - the page is shown (including restores from the back/forward cache)
//! - the page becomes visible again
//! - the window regains focus
//! - another context of the partition writes the cart key
//! - this context's store emits a [`CartEvent`](super::CartEvent)
//!
//! On start the loop refreshes immediately and again after a few short
//! delays, so observers attached while the page is still settling catch up.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use dacsan_core::Cart;

use super::store::CartStore;
use super::views::CartObserver;
use crate::storage::{KeyValueStore, StorageEvent, StorageEvents};

const DEFAULT_INITIAL_DELAYS: [Duration; 2] = [Duration::from_millis(100), Duration::from_millis(500)];

/// Page lifecycle signals delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The page was shown; `persisted` is true for back/forward cache restores.
    PageShow { persisted: bool },
    VisibilityChange { hidden: bool },
    Focus,
}

/// Why observers were refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    PageShown,
    VisibilityRestored,
    FocusRegained,
    StorageChanged,
    CartChanged,
}

impl RefreshTrigger {
    /// The refresh a lifecycle event calls for, if any.
    #[must_use]
    pub const fn for_lifecycle(event: LifecycleEvent) -> Option<Self> {
        match event {
            LifecycleEvent::PageShow { .. } => Some(Self::PageShown),
            LifecycleEvent::VisibilityChange { hidden: false } => Some(Self::VisibilityRestored),
            LifecycleEvent::VisibilityChange { hidden: true } => None,
            LifecycleEvent::Focus => Some(Self::FocusRegained),
        }
    }
}

/// Refresh loop binding a context's cart store to its observers.
pub struct CartSync<S> {
    store: Arc<CartStore<S>>,
    observers: Vec<Box<dyn CartObserver>>,
    initial_delays: Vec<Duration>,
}

impl<S> std::fmt::Debug for CartSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("observers", &self.observers.len())
            .field("initial_delays", &self.initial_delays)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartSync<S> {
    #[must_use]
    pub fn new(store: Arc<CartStore<S>>) -> Self {
        Self {
            store,
            observers: Vec::new(),
            initial_delays: DEFAULT_INITIAL_DELAYS.to_vec(),
        }
    }

    /// Replace the delayed start-up refreshes.
    #[must_use]
    pub fn with_initial_delays(mut self, delays: Vec<Duration>) -> Self {
        self.initial_delays = delays;
        self
    }

    /// Attach an observer.
    pub fn observe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn store(&self) -> &CartStore<S> {
        &self.store
    }

    /// Re-read the cart and push it to every observer.
    pub fn refresh(&mut self, trigger: RefreshTrigger) -> Cart {
        let cart = self.store.get_cart();
        debug!(
            ?trigger,
            count = cart.item_count(),
            observers = self.observers.len(),
            "Refreshing cart observers"
        );
        for observer in &mut self.observers {
            observer.refresh(&cart);
        }
        cart
    }

    /// Run until the lifecycle channel closes.
    ///
    /// `storage` carries writes made by other contexts; pass `None` when the
    /// store is not shared.
    pub async fn run(
        mut self,
        mut lifecycle: mpsc::Receiver<LifecycleEvent>,
        mut storage: Option<StorageEvents>,
    ) {
        let mut cart_events = self.store.subscribe();
        let key = self.store.key().to_string();

        self.refresh(RefreshTrigger::Initial);
        let start = Instant::now();
        let mut pending: VecDeque<Instant> = {
            let mut at: Vec<Instant> = self.initial_delays.iter().map(|d| start + *d).collect();
            at.sort();
            at.into()
        };

        loop {
            let next_delay = pending.front().copied();
            tokio::select! {
                () = sleep_until(next_delay.unwrap_or(start)), if next_delay.is_some() => {
                    pending.pop_front();
                    self.refresh(RefreshTrigger::Initial);
                }
                event = lifecycle.recv() => match event {
                    Some(event) => {
                        if let Some(trigger) = RefreshTrigger::for_lifecycle(event) {
                            self.refresh(trigger);
                        }
                    }
                    None => break,
                },
                event = next_storage_event(&mut storage) => match event {
                    Some(event) if event.concerns(&key) => {
                        self.refresh(RefreshTrigger::StorageChanged);
                    }
                    Some(_) => {}
                    None => {
                        debug!("Storage event stream closed");
                        storage = None;
                    }
                },
                event = cart_events.recv() => match event {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        self.refresh(RefreshTrigger::CartChanged);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        debug!("Cart sync stopped");
    }
}

async fn next_storage_event(storage: &mut Option<StorageEvents>) -> Option<StorageEvent> {
    match storage {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
