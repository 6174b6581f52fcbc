//! Row view-models and table templates for the admin lists.
//!
//! Each view is built `From<&Dto>` with every display string already
//! formatted, so templates only place values.

pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod suppliers;

use chrono::NaiveDateTime;

pub use categories::{CategoriesTable, CategoryRow, CategoryResource};
pub use customers::{CustomerResource, CustomerRow, CustomersTable};
pub use dashboard::{Change, DashboardView, RecentOrderRow, StatCard, TopProductRow, Trend};
pub use orders::{OrderDetailView, OrderResource, OrderRow, OrdersTable};
pub use products::{ProductResource, ProductRow, ProductsTable};
pub use promotions::{PromotionResource, PromotionRow, PromotionStatus, PromotionsTable};
pub use suppliers::{SupplierResource, SupplierRow, SuppliersTable};

/// Image shown when a product or category has none.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

/// Date-time format used across the admin tables.
const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// A status pill: CSS modifier plus label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Full CSS class, e.g. `status-badge status-active`.
    pub class: String,
    pub label: String,
}

impl Badge {
    /// `status-badge status-{modifier}` pill.
    #[must_use]
    pub fn status(modifier: &str, label: impl Into<String>) -> Self {
        Self {
            class: format!("status-badge status-{modifier}"),
            label: label.into(),
        }
    }

    /// `badge badge-{modifier}` pill.
    #[must_use]
    pub fn plain(modifier: &str, label: impl Into<String>) -> Self {
        Self {
            class: format!("badge badge-{modifier}"),
            label: label.into(),
        }
    }
}

/// Format a server date-time for display.
#[must_use]
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Optional date-time, or `fallback` when absent.
#[must_use]
pub fn format_datetime_or(value: Option<&NaiveDateTime>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), format_datetime)
}

/// The value when present and non-blank, `fallback` otherwise.
#[must_use]
pub fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Image URL, or the placeholder.
#[must_use]
pub fn image_or_placeholder(value: Option<&str>) -> String {
    text_or(value, PLACEHOLDER_IMAGE)
}
