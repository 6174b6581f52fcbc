//! Order list rows and the order detail panel.

use askama::Template;
use chrono::NaiveDateTime;

use dacsan_core::{OrderStatus, PaymentStatus, Price};

use super::{Badge, format_datetime_or, text_or};
use crate::api::{self, types::Order};
use crate::listing::Resource;

// =============================================================================
// Badges
// =============================================================================

/// Status pill for an order's lifecycle status.
#[must_use]
pub fn status_badge(status: OrderStatus) -> Badge {
    let modifier = match status {
        OrderStatus::Confirmed | OrderStatus::Processing => "processing",
        OrderStatus::Shipped => "delivered",
        OrderStatus::Delivered => "active",
        OrderStatus::Cancelled => "cancelled",
        OrderStatus::Pending | OrderStatus::Unknown => "pending",
    };
    Badge::status(modifier, status.as_str())
}

/// Status pill for an order's payment status.
#[must_use]
pub fn payment_badge(status: PaymentStatus) -> Badge {
    let modifier = match status {
        PaymentStatus::Completed => "active",
        PaymentStatus::Failed => "cancelled",
        PaymentStatus::Pending | PaymentStatus::Unknown => "pending",
    };
    Badge::status(modifier, status.as_str())
}

// =============================================================================
// List
// =============================================================================

/// One row of the orders table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub order_date: String,
    pub total: String,
    pub status: Badge,
    /// `None` renders as "N/A".
    pub payment: Option<Badge>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let customer_name = order
            .customer_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(order.user_full_name.as_deref());
        let customer_email = order
            .customer_email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .or(order.user_email.as_deref());

        Self {
            id: order.id.as_i64(),
            order_number: text_or(Some(&order.order_number), "N/A"),
            customer_name: text_or(customer_name, "Khách"),
            customer_email: text_or(customer_email, ""),
            order_date: format_datetime_or(order.order_date.as_ref(), "N/A"),
            total: order.total_amount.display(),
            status: status_badge(order.status),
            payment: order.payment_status.map(payment_badge),
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/orders.html")]
pub struct OrdersTable {
    pub rows: Vec<OrderRow>,
}

/// Orders list: `/api/admin/orders`, filtered by `status` and optionally
/// `startDate` / `endDate`.
#[derive(Debug, Clone, Copy)]
pub struct OrderResource;

impl Resource for OrderResource {
    type Item = Order;
    type Table = OrdersTable;

    const ENDPOINT: &'static str = api::ORDERS;
    const STATUS_PARAM: &'static str = "status";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh sách đơn hàng";

    fn table(items: &[Order], _now: NaiveDateTime) -> OrdersTable {
        OrdersTable {
            rows: items.iter().map(OrderRow::from).collect(),
        }
    }
}

// =============================================================================
// Detail
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
}

/// Order detail panel with lines and totals.
#[derive(Debug, Clone, Template)]
#[template(path = "tables/order_detail.html")]
pub struct OrderDetailView {
    pub id: i64,
    pub order_number: String,
    pub order_date: String,
    pub status: Badge,
    pub payment: Option<Badge>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub lines: Vec<OrderLineView>,
    /// Total minus shipping.
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        let shipping_fee = order.shipping_fee.unwrap_or(Price::ZERO);
        let subtotal = Price::new(order.total_amount.amount() - shipping_fee.amount());

        Self {
            id: order.id.as_i64(),
            order_number: text_or(Some(&order.order_number), "N/A"),
            order_date: format_datetime_or(order.order_date.as_ref(), "N/A"),
            status: status_badge(order.status),
            payment: order.payment_status.map(payment_badge),
            customer_name: text_or(order.customer_name.as_deref(), "N/A"),
            customer_email: text_or(order.customer_email.as_deref(), "N/A"),
            customer_phone: text_or(order.customer_phone.as_deref(), "N/A"),
            shipping_address: text_or(order.shipping_address_text.as_deref(), "N/A"),
            lines: order
                .order_items
                .iter()
                .map(|line| OrderLineView {
                    product_name: text_or(Some(&line.product_name), "N/A"),
                    quantity: line.quantity,
                    unit_price: line.unit_price.display(),
                    total_price: line.total_price.display(),
                })
                .collect(),
            subtotal: subtotal.display(),
            shipping_fee: shipping_fee.display(),
            total: order.total_amount.display(),
        }
    }
}
