//! The browser-local cart.
//!
//! [`CartStore`] owns reads and writes of the cart document. Same-context
//! observers learn about changes from [`CartEvent`]s; other contexts learn
//! about them from storage-change events on the shared partition.
//! [`sync::CartSync`] turns both, plus page lifecycle signals, into
//! re-renders of the [`views`].

mod events;
mod store;
pub mod sync;
pub mod views;

pub use events::CartEvent;
pub use store::{CART_KEY, CartStore, CartStoreOptions, WritePolicy};
