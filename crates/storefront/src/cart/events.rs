//! In-process cart notifications.

use dacsan_core::{Cart, ProductId};

/// A change made through a [`CartStore`](super::CartStore) in this context.
///
/// Storage-change events never reach the context that wrote, so these are
/// how the writing tab's own badge and dropdown find out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart was written.
    Updated { cart: Cart },
    /// A line was removed. Sent in addition to `Updated`.
    ItemRemoved { product_id: ProductId, cart: Cart },
    /// The cart document was deleted.
    Cleared,
}

impl CartEvent {
    /// The cart as of this event (empty for `Cleared`).
    #[must_use]
    pub fn cart(&self) -> Cart {
        match self {
            Self::Updated { cart } | Self::ItemRemoved { cart, .. } => cart.clone(),
            Self::Cleared => Cart::empty(),
        }
    }
}
