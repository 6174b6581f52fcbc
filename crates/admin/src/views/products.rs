//! Product inventory rows.

use askama::Template;
use chrono::NaiveDateTime;

use dacsan_core::StockStatus;

use super::{Badge, image_or_placeholder, text_or};
use crate::api::{self, types::Product};
use crate::listing::Resource;

/// Stock pill for an on-hand quantity.
#[must_use]
pub fn stock_badge(quantity: i64) -> Badge {
    match StockStatus::from_quantity(quantity) {
        StockStatus::OutOfStock => Badge::status("cancelled", "Hết Hàng"),
        StockStatus::Low => Badge::status("pending", "Sắp Hết"),
        StockStatus::InStock => Badge::status("active", "Còn Hàng"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub sku: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    pub stock_status: Badge,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            image_url: image_or_placeholder(product.image_url.as_deref()),
            sku: format!("SKU: {}", product.id),
            category: text_or(product.category_name.as_deref(), "N/A"),
            price: product.price.display(),
            stock: format!("{} đơn vị", product.stock_quantity),
            stock_status: stock_badge(product.stock_quantity),
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/products.html")]
pub struct ProductsTable {
    pub rows: Vec<ProductRow>,
}

/// Inventory list: `/api/inventory/products`, filtered by `status` and
/// optionally `categoryId`.
#[derive(Debug, Clone, Copy)]
pub struct ProductResource;

impl Resource for ProductResource {
    type Item = Product;
    type Table = ProductsTable;

    const ENDPOINT: &'static str = api::PRODUCTS;
    const STATUS_PARAM: &'static str = "status";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh sách sản phẩm";

    fn table(items: &[Product], _now: NaiveDateTime) -> ProductsTable {
        ProductsTable {
            rows: items.iter().map(ProductRow::from).collect(),
        }
    }
}
