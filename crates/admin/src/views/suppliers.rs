//! Supplier (distributor) rows.

use askama::Template;
use chrono::NaiveDateTime;

use super::{Badge, text_or};
use crate::api::{self, types::Supplier};
use crate::listing::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierRow {
    pub id: i64,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Untruncated address for the cell tooltip; empty when unknown.
    pub address_title: String,
    pub status: Badge,
}

impl From<&Supplier> for SupplierRow {
    fn from(supplier: &Supplier) -> Self {
        let status = if supplier.is_active {
            Badge::plain("success", "Hoạt động")
        } else {
            Badge::plain("secondary", "Ngừng")
        };

        Self {
            id: supplier.id.as_i64(),
            name: supplier.name.clone(),
            contact_person: text_or(supplier.contact_person.as_deref(), "-"),
            phone: text_or(supplier.phone.as_deref(), "-"),
            email: text_or(supplier.email.as_deref(), "-"),
            address: text_or(supplier.address.as_deref(), "-"),
            address_title: text_or(supplier.address.as_deref(), ""),
            status,
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/suppliers.html")]
pub struct SuppliersTable {
    pub rows: Vec<SupplierRow>,
}

/// Supplier list: `/admin/suppliers/list`, filtered by `isActive`.
#[derive(Debug, Clone, Copy)]
pub struct SupplierResource;

impl Resource for SupplierResource {
    type Item = Supplier;
    type Table = SuppliersTable;

    const ENDPOINT: &'static str = api::SUPPLIERS;
    const STATUS_PARAM: &'static str = "isActive";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh sách nhà phân phối";

    fn table(items: &[Supplier], _now: NaiveDateTime) -> SuppliersTable {
        SuppliersTable {
            rows: items.iter().map(SupplierRow::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_fallbacks() {
        let supplier: Supplier =
            serde_json::from_str(r#"{"id":5,"name":"Đặc sản Tây Bắc","isActive":true}"#).unwrap();
        let row = SupplierRow::from(&supplier);
        assert_eq!(row.contact_person, "-");
        assert_eq!(row.address, "-");
        assert_eq!(row.address_title, "");
        assert_eq!(row.status, Badge::plain("success", "Hoạt động"));
    }

    #[test]
    fn test_markup_escapes_names() {
        let supplier: Supplier =
            serde_json::from_str(r#"{"id":6,"name":"O'Hara & Sons","isActive":false}"#).unwrap();
        let html = SupplierResource::table(&[supplier], NaiveDateTime::default())
            .render()
            .unwrap();
        assert!(!html.contains("O'Hara & Sons"));
        assert!(html.contains("O&#39;Hara &#38; Sons"));
        assert!(html.contains("Ngừng"));

        let html = SupplierResource::table(&[], NaiveDateTime::default())
            .render()
            .unwrap();
        assert!(html.contains("Không có nhà phân phối nào"));
    }
}
