//! Browser-local cart model.
//!
//! The cart document is what gets persisted under a single storage key. All
//! mutation goes through [`Cart`] methods so the one-line-per-product and
//! positive-quantity invariants hold, and `total` is always recomputed from
//! the lines rather than trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: String,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Input for adding a product to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub image_url: String,
}

impl NewCartItem {
    fn into_item(self, added_at: DateTime<Utc>) -> CartItem {
        CartItem {
            product_id: self.product_id,
            product_name: self.product_name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            image_url: self.image_url,
            added_at,
        }
    }
}

/// The persisted cart document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default)]
    total: Price,
    /// Epoch milliseconds of the last mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified: Option<i64>,
}

impl Cart {
    /// An empty cart with no modification stamp.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::ZERO,
            last_modified: None,
        }
    }

    /// Build a cart from lines, normalizing them.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self {
            items,
            total: Price::ZERO,
            last_modified: None,
        }
        .sanitized()
    }

    /// Lines in add order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Cached total. Equal to [`Cart::computed_total`] for any cart produced
    /// by this module.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Epoch milliseconds of the last mutation, if the cart was ever saved.
    #[must_use]
    pub const fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Σ `unit_price × quantity`, ignoring the cached total.
    #[must_use]
    pub fn computed_total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add a product, merging into an existing line for the same product.
    ///
    /// Returns `false` (and leaves the cart untouched) for a zero quantity
    /// or a negative price.
    pub fn add(&mut self, new_item: NewCartItem, now: DateTime<Utc>) -> bool {
        if new_item.quantity == 0 || new_item.unit_price.is_negative() {
            return false;
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == new_item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(new_item.quantity);
        } else {
            self.items.push(new_item.into_item(now));
        }

        self.recompute_total();
        true
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }

        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        else {
            return false;
        };

        item.quantity = quantity;
        self.recompute_total();
        true
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.recompute_total();
        self.items.len() != before
    }

    /// Recompute and cache the total from the lines.
    pub fn recompute_total(&mut self) -> Price {
        self.total = self.computed_total();
        self.total
    }

    /// Stamp the modification time.
    pub const fn touch(&mut self, epoch_millis: i64) {
        self.last_modified = Some(epoch_millis);
    }

    /// Normalize a cart read from storage.
    ///
    /// Drops zero-quantity and negative-price lines, merges duplicate
    /// products into their first line and recomputes the total.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if item.quantity == 0 || item.unit_price.is_negative() {
                continue;
            }
            if let Some(existing) = merged
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                merged.push(item);
            }
        }
        self.items = merged;
        self.recompute_total();
        self
    }
}
