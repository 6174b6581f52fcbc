//! Category rows.

use askama::Template;
use chrono::NaiveDateTime;

use super::{Badge, format_datetime_or, text_or};
use crate::api::{self, types::Category};
use crate::listing::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    /// No placeholder image; the template draws an empty box instead.
    pub image_url: Option<String>,
    pub description: String,
    pub product_count: u64,
    pub product_count_label: String,
    pub is_active: bool,
    pub status: Badge,
    pub created_at: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        let status = if category.is_active {
            Badge::status("active", "Hoạt động")
        } else {
            Badge::status("cancelled", "Tạm dừng")
        };

        Self {
            id: category.id.as_i64(),
            name: category.name.clone(),
            image_url: category
                .image_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            description: text_or(category.description.as_deref(), "-"),
            product_count: category.product_count,
            product_count_label: format!("{} sản phẩm", category.product_count),
            is_active: category.is_active,
            status,
            created_at: format_datetime_or(category.created_at.as_ref(), "-"),
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/categories.html")]
pub struct CategoriesTable {
    pub rows: Vec<CategoryRow>,
}

/// Category list: `/admin/categories/list`, filtered by `isActive`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryResource;

impl Resource for CategoryResource {
    type Item = Category;
    type Table = CategoriesTable;

    const ENDPOINT: &'static str = api::CATEGORIES;
    const STATUS_PARAM: &'static str = "isActive";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh mục";

    fn table(items: &[Category], _now: NaiveDateTime) -> CategoriesTable {
        CategoriesTable {
            rows: items.iter().map(CategoryRow::from).collect(),
        }
    }
}
