//! Cart badge and dropdown view-models.
//!
//! Views hold preformatted display strings and render through compiled
//! templates, so product names are always HTML-escaped.

use std::sync::{Arc, Mutex};

use askama::Template;
use tracing::{error, warn};

use dacsan_core::{Cart, CartItem, Price};

/// Something that displays the cart and must be refreshed when it changes.
pub trait CartObserver: Send {
    /// Re-derive display state from `cart`.
    fn refresh(&mut self, cart: &Cart);
}

impl<T: CartObserver> CartObserver for Arc<Mutex<T>> {
    fn refresh(&mut self, cart: &Cart) {
        match self.lock() {
            Ok(mut inner) => inner.refresh(cart),
            Err(e) => warn!(error = %e, "Cart observer lock poisoned, skipping refresh"),
        }
    }
}

/// Render a template, logging and returning empty markup on failure.
pub fn render_markup(template: &impl Template) -> String {
    template.render().unwrap_or_else(|e| {
        error!(error = %e, "Failed to render cart fragment");
        String::new()
    })
}

// =============================================================================
// Badge
// =============================================================================

/// Header cart-count badge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Template)]
#[template(path = "partials/cart_badge.html")]
pub struct CartBadgeView {
    pub count: u64,
    pub visible: bool,
}

impl From<&Cart> for CartBadgeView {
    fn from(cart: &Cart) -> Self {
        let count = cart.item_count();
        Self {
            count,
            visible: count > 0,
        }
    }
}

impl CartObserver for CartBadgeView {
    fn refresh(&mut self, cart: &Cart) {
        *self = Self::from(cart);
    }
}

// =============================================================================
// Dropdown
// =============================================================================

/// One line of the cart dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.product_name.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            price: item.unit_price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Header cart dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Template)]
#[template(path = "partials/cart_dropdown.html")]
pub struct CartDropdownView {
    pub items: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl Default for CartDropdownView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO.display(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartDropdownView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            subtotal: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

impl CartObserver for CartDropdownView {
    fn refresh(&mut self, cart: &Cart) {
        *self = Self::from(cart);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use dacsan_core::{NewCartItem, ProductId};

    use super::*;

    fn cart_with(name: &str, quantity: u32) -> Cart {
        let mut cart = Cart::empty();
        cart.add(
            NewCartItem {
                product_id: ProductId::new(42),
                product_name: name.to_string(),
                unit_price: Price::from_dong(15_000),
                quantity,
                image_url: "/a.jpg".to_string(),
            },
            Utc::now(),
        );
        cart
    }

    #[test]
    fn test_badge_hidden_when_empty() {
        let badge = CartBadgeView::from(&Cart::empty());
        assert_eq!(badge.count, 0);
        assert!(!badge.visible);

        let markup = render_markup(&badge);
        assert!(markup.contains(">0<"));
        assert!(markup.contains("hidden"));
    }

    #[test]
    fn test_badge_shows_quantity_sum() {
        let mut badge = CartBadgeView::default();
        badge.refresh(&cart_with("Ổi", 3));
        assert_eq!(badge.count, 3);
        assert!(badge.visible);
        assert!(!render_markup(&badge).contains("hidden"));
    }

    #[test]
    fn test_dropdown_formats_vnd() {
        let view = CartDropdownView::from(&cart_with("Ổi", 3));
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].price, "15.000₫");
        assert_eq!(view.items[0].line_total, "45.000₫");
        assert_eq!(view.subtotal, "45.000₫");

        let markup = render_markup(&view);
        assert!(markup.contains("Ổi"));
        assert!(markup.contains("45.000₫"));
    }

    #[test]
    fn test_dropdown_escapes_names() {
        let view = CartDropdownView::from(&cart_with("<script>alert(1)</script>", 1));
        let markup = render_markup(&view);
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&#60;script&#62;"));
    }

    #[test]
    fn test_empty_dropdown() {
        let view = CartDropdownView::default();
        assert_eq!(view.subtotal, "0₫");
        assert!(render_markup(&view).contains("Giỏ hàng trống"));
    }

    #[test]
    fn test_shared_observer_refreshes_inner() {
        let shared = Arc::new(Mutex::new(CartBadgeView::default()));
        let mut handle = Arc::clone(&shared);
        handle.refresh(&cart_with("Ổi", 2));
        assert_eq!(shared.lock().unwrap().count, 2);
    }
}
