//! Cart store: read-modify-write of the cart document.
//!
//! Every mutation reads the full document, applies the change in memory,
//! stamps `lastModified` and writes the full document back under one key.
//! There are no partial-field updates.
//!
//! Storage trouble never reaches the caller:
//! - a missing, unreadable or malformed document reads as an empty cart
//! - a failed write is logged and the in-memory result is still returned

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, instrument, warn};

use dacsan_core::{Cart, NewCartItem, ProductId};

use super::events::CartEvent;
use crate::storage::{CasOutcome, KeyValueStore};

/// Default storage key of the cart document.
pub const CART_KEY: &str = "shopping_cart";

const EVENT_CAPACITY: usize = 64;
const DEFAULT_MAX_CAS_ATTEMPTS: u32 = 3;

/// How a mutation commits when another context may be writing too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Overwrite unconditionally. Two contexts mutating at nearly the same
    /// instant can lose one of the changes.
    #[default]
    LastWriteWins,
    /// Commit only if the document is unchanged since it was read;
    /// otherwise re-read and replay the mutation.
    CompareAndSwap,
}

impl std::fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWriteWins => write!(f, "last-write-wins"),
            Self::CompareAndSwap => write!(f, "compare-and-swap"),
        }
    }
}

impl std::str::FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-write-wins" | "lww" => Ok(Self::LastWriteWins),
            "compare-and-swap" | "cas" => Ok(Self::CompareAndSwap),
            _ => Err(format!("invalid write policy: {s}")),
        }
    }
}

/// Construction options for [`CartStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreOptions {
    /// Storage key of the cart document.
    pub key: String,
    /// Commit strategy.
    pub write_policy: WritePolicy,
    /// Commit attempts under [`WritePolicy::CompareAndSwap`] before giving up.
    pub max_cas_attempts: u32,
}

impl Default for CartStoreOptions {
    fn default() -> Self {
        Self {
            key: CART_KEY.to_string(),
            write_policy: WritePolicy::default(),
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }
}

/// What a mutation did to the in-memory cart.
enum Change {
    /// Nothing to persist.
    Unchanged,
    Written,
    Removed(ProductId),
}

/// The cart of one browsing context.
///
/// Construct one per context over that context's storage; drop it (or call
/// [`CartStore::shutdown`]) to close its event channel.
pub struct CartStore<S> {
    storage: S,
    options: CartStoreOptions,
    events: broadcast::Sender<CartEvent>,
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("options", &self.options)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a store with default options.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, CartStoreOptions::default())
    }

    /// Create a store with explicit options.
    #[must_use]
    pub fn with_options(storage: S, options: CartStoreOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            options,
            events,
        }
    }

    /// Storage key of the cart document.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.options.key
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Subscribe to in-process cart events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Tear the store down. Subscribers see their channel close.
    pub fn shutdown(self) {
        debug!(
            key = %self.options.key,
            subscribers = self.events.receiver_count(),
            "Cart store shut down"
        );
    }

    /// Current cart, or an empty cart if none is stored or it is unreadable.
    #[must_use]
    pub fn get_cart(&self) -> Cart {
        parse_cart(self.read_raw().as_deref())
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn get_item_count(&self) -> u64 {
        self.get_cart().item_count()
    }

    /// Add a product, merging with an existing line for the same product.
    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = item.quantity))]
    pub fn add_item(&self, item: NewCartItem) -> Cart {
        self.mutate("add_item", |cart| {
            if cart.add(item.clone(), Utc::now()) {
                Change::Written
            } else {
                Change::Unchanged
            }
        })
    }

    /// Set a line's quantity; zero or less removes the line.
    #[instrument(skip(self))]
    pub fn update_item(&self, product_id: ProductId, quantity: i64) -> Cart {
        if quantity <= 0 {
            return self.mutate("update_item", |cart| {
                if cart.remove(product_id) {
                    Change::Removed(product_id)
                } else {
                    Change::Unchanged
                }
            });
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        self.mutate("update_item", |cart| {
            if cart.set_quantity(product_id, quantity) {
                Change::Written
            } else {
                Change::Unchanged
            }
        })
    }

    /// Remove a product's line.
    #[instrument(skip(self))]
    pub fn remove_item(&self, product_id: ProductId) -> Cart {
        self.mutate("remove_item", |cart| {
            if cart.remove(product_id) {
                Change::Removed(product_id)
            } else {
                Change::Written
            }
        })
    }

    /// Delete the stored cart document.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        match self.storage.remove_item(&self.options.key) {
            Ok(()) => {
                let _ = self.events.send(CartEvent::Cleared);
            }
            Err(e) => error!(error = %e, "Failed to clear cart"),
        }
    }

    fn read_raw(&self) -> Option<String> {
        self.storage
            .get_item(&self.options.key)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read cart, treating as empty");
                None
            })
    }

    fn mutate(&self, op: &'static str, mut apply: impl FnMut(&mut Cart) -> Change) -> Cart {
        let mut raw = self.read_raw();
        let mut attempts = 0u32;

        loop {
            let mut cart = parse_cart(raw.as_deref());
            let change = apply(&mut cart);
            if matches!(change, Change::Unchanged) {
                return cart;
            }

            cart.touch(Utc::now().timestamp_millis());
            let json = match serde_json::to_string(&cart) {
                Ok(json) => json,
                Err(e) => {
                    error!(op, error = %e, "Failed to serialize cart");
                    return cart;
                }
            };

            let committed = match self.options.write_policy {
                WritePolicy::LastWriteWins => self
                    .storage
                    .set_item(&self.options.key, &json)
                    .map(|()| true),
                WritePolicy::CompareAndSwap => {
                    match self
                        .storage
                        .compare_and_swap(&self.options.key, raw.as_deref(), Some(&json))
                    {
                        Ok(CasOutcome::Swapped) => Ok(true),
                        Ok(CasOutcome::Conflict { current }) => {
                            attempts += 1;
                            if attempts < self.options.max_cas_attempts {
                                debug!(op, attempts, "Cart changed since read, replaying");
                                raw = current;
                                continue;
                            }
                            error!(op, attempts, "Cart kept changing underneath, change not saved");
                            Ok(false)
                        }
                        Err(e) => Err(e),
                    }
                }
            };

            match committed {
                Ok(true) => self.notify(&cart, &change),
                Ok(false) => {}
                Err(e) => error!(op, error = %e, "Failed to save cart"),
            }
            return cart;
        }
    }

    fn notify(&self, cart: &Cart, change: &Change) {
        // No receivers just means nothing in this context is listening.
        let _ = self.events.send(CartEvent::Updated { cart: cart.clone() });
        if let Change::Removed(product_id) = change {
            let _ = self.events.send(CartEvent::ItemRemoved {
                product_id: *product_id,
                cart: cart.clone(),
            });
        }
    }
}

fn parse_cart(raw: Option<&str>) -> Cart {
    let Some(raw) = raw else {
        return Cart::empty();
    };
    match serde_json::from_str::<Cart>(raw) {
        Ok(cart) => cart.sanitized(),
        Err(e) => {
            warn!(error = %e, "Stored cart is malformed, treating as empty");
            Cart::empty()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use dacsan_core::Price;

    use super::*;
    use crate::error::Result;
    use crate::storage::MemoryStore;

    fn guava(quantity: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(42),
            product_name: "Ổi".to_string(),
            unit_price: Price::from_dong(15_000),
            quantity,
            image_url: "/a.jpg".to_string(),
        }
    }

    fn product(id: i64, quantity: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(id),
            product_name: format!("product-{id}"),
            unit_price: Price::from_dong(10_000),
            quantity,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_guava_scenario() {
        let store = CartStore::new(MemoryStore::new());
        assert!(store.get_cart().is_empty());

        let cart = store.add_item(guava(1));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Price::from_dong(15_000));

        let cart = store.add_item(guava(2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Price::from_dong(45_000));

        let cart = store.update_item(ProductId::new(42), 1);
        assert_eq!(cart.total(), Price::from_dong(15_000));

        let cart = store.remove_item(ProductId::new(42));
        assert!(cart.is_empty());
        assert!(store.get_cart().is_empty());
    }

    #[test]
    fn test_item_count_over_distinct_products() {
        let store = CartStore::new(MemoryStore::new());
        let quantities = [3u32, 1, 4, 1, 5];
        for (id, qty) in (1..).zip(quantities) {
            store.add_item(product(id, qty));
        }
        assert_eq!(store.get_item_count(), 14);
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let store = CartStore::new(MemoryStore::new());
        store.add_item(product(1, 2));
        store.add_item(product(2, 2));

        store.update_item(ProductId::new(1), 0);
        store.update_item(ProductId::new(2), -3);

        assert!(store.get_cart().is_empty());
    }

    #[test]
    fn test_clear_then_get_is_empty() {
        let store = CartStore::new(MemoryStore::new());
        store.add_item(product(1, 2));
        store.clear_cart();

        let cart = store.get_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(store.storage().get_item(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_document_reads_as_empty() {
        let storage = MemoryStore::new();
        storage.set_item(CART_KEY, "{not json").unwrap();
        let store = CartStore::new(storage);

        assert!(store.get_cart().is_empty());

        // The next mutation overwrites the garbage.
        let cart = store.add_item(product(1, 1));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(store.get_cart().item_count(), 1);
    }

    #[test]
    fn test_external_total_write_is_ignored() {
        let storage = MemoryStore::new();
        storage
            .set_item(
                CART_KEY,
                r#"{"items":[{"productId":1,"productName":"X","price":10000,"quantity":2,"imageUrl":"/img.jpg","addedAt":"2024-01-01T00:00:00Z"}],"total":999,"lastModified":1700000000000}"#,
            )
            .unwrap();
        let store = CartStore::new(storage);

        assert_eq!(store.get_cart().total(), Price::from_dong(20_000));
    }

    #[test]
    fn test_stored_amounts_are_whole_numbers() {
        let store = CartStore::new(MemoryStore::new());
        store.add_item(guava(3));

        let raw = store.storage().get_item(CART_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""price":15000,"#));
        assert!(raw.contains(r#""total":45000,"#));
    }

    #[test]
    fn test_quota_failure_still_returns_result() {
        let store = CartStore::new(MemoryStore::with_quota(16));
        let mut events = store.subscribe();

        let cart = store.add_item(guava(1));

        assert_eq!(cart.item_count(), 1);
        assert!(store.get_cart().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_events_for_add_and_remove() {
        let store = CartStore::new(MemoryStore::new());
        let mut events = store.subscribe();

        store.add_item(guava(1));
        assert!(matches!(events.try_recv().unwrap(), CartEvent::Updated { .. }));

        store.remove_item(ProductId::new(42));
        assert!(matches!(events.try_recv().unwrap(), CartEvent::Updated { .. }));
        match events.try_recv().unwrap() {
            CartEvent::ItemRemoved { product_id, cart } => {
                assert_eq!(product_id, ProductId::new(42));
                assert!(cart.is_empty());
            }
            other => panic!("expected ItemRemoved, got {other:?}"),
        }

        // Removing something that is not there writes but is not a removal.
        store.remove_item(ProductId::new(42));
        assert!(matches!(events.try_recv().unwrap(), CartEvent::Updated { .. }));
        assert!(events.try_recv().is_err());

        store.clear_cart();
        assert_eq!(events.try_recv().unwrap(), CartEvent::Cleared);
    }

    #[test]
    fn test_noop_mutations_do_not_write() {
        let store = CartStore::new(MemoryStore::new());
        let mut events = store.subscribe();

        store.add_item(guava(0));
        store.update_item(ProductId::new(7), 3);
        store.update_item(ProductId::new(7), 0);
        store.update_item(ProductId::new(7), -1);

        assert!(events.try_recv().is_err());
        assert_eq!(store.storage().get_item(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let store = CartStore::new(MemoryStore::new());
        let mut events = store.subscribe();

        let cart = store.add_item(NewCartItem {
            unit_price: Price::from_dong(-5_000),
            ..guava(2)
        });

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert!(events.try_recv().is_err());
        assert_eq!(store.storage().get_item(CART_KEY).unwrap(), None);

        store.add_item(guava(1));
        let cart = store.add_item(NewCartItem {
            unit_price: Price::from_dong(-5_000),
            ..guava(2)
        });
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(store.get_cart(), cart);
    }

    #[test]
    fn test_update_to_zero_emits_removal() {
        let store = CartStore::new(MemoryStore::new());
        store.add_item(guava(1));
        let mut events = store.subscribe();

        store.update_item(ProductId::new(42), 0);
        assert!(matches!(events.try_recv().unwrap(), CartEvent::Updated { .. }));
        assert!(matches!(
            events.try_recv().unwrap(),
            CartEvent::ItemRemoved { .. }
        ));
    }

    #[test]
    fn test_stores_are_isolated_by_key() {
        let storage = Arc::new(MemoryStore::new());
        let first = CartStore::new(Arc::clone(&storage));
        let second = CartStore::with_options(
            Arc::clone(&storage),
            CartStoreOptions {
                key: "other_cart".to_string(),
                ..CartStoreOptions::default()
            },
        );

        first.add_item(product(1, 1));
        assert!(second.get_cart().is_empty());
        assert_eq!(first.get_item_count(), 1);
    }

    #[test]
    fn test_shutdown_closes_subscribers() {
        let store = CartStore::new(MemoryStore::new());
        let mut events = store.subscribe();
        store.shutdown();
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }

    /// Storage that lets another writer sneak in once, between the store's
    /// read and its commit.
    struct InterleavingStore {
        inner: MemoryStore,
        interloper: Option<String>,
        fired: AtomicBool,
    }

    impl KeyValueStore for InterleavingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            self.interfere(key)?;
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }

        fn compare_and_swap(
            &self,
            key: &str,
            expected: Option<&str>,
            new: Option<&str>,
        ) -> Result<CasOutcome> {
            self.interfere(key)?;
            self.inner.compare_and_swap(key, expected, new)
        }
    }

    impl InterleavingStore {
        fn interfere(&self, key: &str) -> Result<()> {
            if let Some(doc) = &self.interloper
                && !self.fired.swap(true, Ordering::SeqCst)
            {
                self.inner.set_item(key, doc)?;
            }
            Ok(())
        }
    }

    fn other_tab_document() -> String {
        let other = CartStore::new(MemoryStore::new());
        other.add_item(product(7, 2));
        other.storage().get_item(CART_KEY).unwrap().unwrap()
    }

    #[test]
    fn test_last_write_wins_loses_concurrent_change() {
        let store = CartStore::new(InterleavingStore {
            inner: MemoryStore::new(),
            interloper: Some(other_tab_document()),
            fired: AtomicBool::new(false),
        });

        store.add_item(guava(1));

        let cart = store.get_cart();
        assert!(cart.get(ProductId::new(7)).is_none());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_compare_and_swap_replays_on_conflict() {
        let store = CartStore::with_options(
            InterleavingStore {
                inner: MemoryStore::new(),
                interloper: Some(other_tab_document()),
                fired: AtomicBool::new(false),
            },
            CartStoreOptions {
                write_policy: WritePolicy::CompareAndSwap,
                ..CartStoreOptions::default()
            },
        );

        let returned = store.add_item(guava(1));

        let cart = store.get_cart();
        assert_eq!(cart.get(ProductId::new(7)).unwrap().quantity, 2);
        assert_eq!(cart.get(ProductId::new(42)).unwrap().quantity, 1);
        assert_eq!(returned.items(), cart.items());
        assert_eq!(cart.total(), Price::from_dong(35_000));
    }

    #[test]
    fn test_write_policy_parse() {
        assert_eq!("cas".parse::<WritePolicy>().unwrap(), WritePolicy::CompareAndSwap);
        assert_eq!(
            "last-write-wins".parse::<WritePolicy>().unwrap(),
            WritePolicy::LastWriteWins
        );
        assert!("merge".parse::<WritePolicy>().is_err());
        assert_eq!(WritePolicy::CompareAndSwap.to_string(), "compare-and-swap");
    }
}
