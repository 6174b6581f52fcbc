//! Customer rows.

use askama::Template;
use chrono::NaiveDateTime;

use super::{Badge, text_or};
use crate::api::{self, types::Customer};
use crate::listing::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub id: i64,
    /// First letter of the name, upper-cased; `U` without a name.
    pub initial: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub orders: String,
    pub total_spent: String,
    pub status: Badge,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        let initial = customer
            .full_name
            .as_deref()
            .and_then(|name| name.trim().chars().next())
            .map_or_else(|| "U".to_string(), |c| c.to_uppercase().collect());

        Self {
            id: customer.id.as_i64(),
            initial,
            full_name: text_or(customer.full_name.as_deref(), "N/A"),
            email: text_or(customer.email.as_deref(), ""),
            phone: text_or(customer.phone_number.as_deref(), "N/A"),
            orders: format!("{} orders", customer.total_orders),
            total_spent: customer.total_spent.display(),
            status: Badge::status("active", "Active"),
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/customers.html")]
pub struct CustomersTable {
    pub rows: Vec<CustomerRow>,
}

/// Customer list: `/api/admin/users`.
#[derive(Debug, Clone, Copy)]
pub struct CustomerResource;

impl Resource for CustomerResource {
    type Item = Customer;
    type Table = CustomersTable;

    const ENDPOINT: &'static str = api::CUSTOMERS;
    const STATUS_PARAM: &'static str = "status";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh sách khách hàng";

    fn table(items: &[Customer], _now: NaiveDateTime) -> CustomersTable {
        CustomersTable {
            rows: items.iter().map(CustomerRow::from).collect(),
        }
    }
}
