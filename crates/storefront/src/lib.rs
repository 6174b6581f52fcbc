//! Dacsan Storefront library.
//!
//! The browser-local cart: the authoritative record of one browser
//! profile's cart, persisted under a single key of a local key-value store,
//! shared between every browsing context (tab/window) of that profile and
//! mirrored into any number of UI fragments.
//!
//! # Modules
//!
//! - [`storage`] - `KeyValueStore` trait, memory and file backends, and
//!   partitions that deliver storage-change events to other contexts
//! - [`cart`] - `CartStore`, in-process cart events, badge/dropdown views and
//!   the refresh loop that keeps them current
//! - [`config`] - Environment configuration
//!
//! The cart never leaves the browser profile: there is no server sync.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod storage;

pub use cart::sync::{CartSync, LifecycleEvent, RefreshTrigger};
pub use cart::views::{CartBadgeView, CartDropdownView, CartObserver};
pub use cart::{CART_KEY, CartEvent, CartStore, CartStoreOptions, WritePolicy};
pub use config::{ConfigError, StorefrontConfig};
pub use error::StorageError;
pub use storage::{
    BrowsingContext, CasOutcome, FileStore, KeyValueStore, MemoryStore, Partition, StorageEvent,
    StorageEvents,
};
