//! Dashboard: headline stats, recent orders and best sellers.
//!
//! The three sections load concurrently and independently; a section that
//! fails renders empty and adds a notice.

use askama::Template;
use rust_decimal::Decimal;
use tracing::instrument;

use dacsan_core::{OrderStatus, format_vnd};

use super::{Badge, format_datetime_or, image_or_placeholder, text_or};
use crate::api::AdminApiClient;
use crate::api::types::{DashboardStats, Order, TopProduct};
use crate::notice::Notice;

/// Reporting period used when none is chosen.
pub const DEFAULT_PERIOD: &str = "30days";

const RECENT_ORDERS_LIMIT: u32 = 10;
const TOP_PRODUCTS_LIMIT: u32 = 5;

// =============================================================================
// Stat cards
// =============================================================================

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Up => "positive",
            Self::Down => "negative",
            Self::Flat => "",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Up => "bi-arrow-up",
            Self::Down => "bi-arrow-down",
            Self::Flat => "bi-dash",
        }
    }
}

/// Period-over-period change shown under a stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub trend: Trend,
    /// Magnitude only; the trend carries the sign.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    /// `None` for cards without a change indicator.
    pub change: Option<Change>,
}

impl StatCard {
    fn new(title: &'static str, value: String, change: Option<f64>) -> Self {
        Self {
            title,
            value,
            change: change.map(signed_change),
        }
    }
}

/// Trend and magnitude label for a percentage change, one decimal place.
#[must_use]
pub fn signed_change(value: f64) -> Change {
    let (trend, label) = if value > 0.0 {
        (Trend::Up, format!("{value:.1}%"))
    } else if value < 0.0 {
        (Trend::Down, format!("{:.1}%", value.abs()))
    } else {
        (Trend::Flat, "0%".to_string())
    };
    Change { trend, label }
}

/// Whole number with `.` thousands separators.
#[must_use]
pub fn format_count(value: u64) -> String {
    let formatted = format_vnd(Decimal::from(value));
    formatted.trim_end_matches('₫').to_string()
}

fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    vec![
        StatCard::new(
            "Doanh thu",
            stats.total_revenue.display(),
            Some(stats.revenue_change),
        ),
        StatCard::new(
            "Đơn hàng",
            format_count(stats.total_orders),
            Some(stats.orders_change),
        ),
        StatCard::new("Giá trị TB/đơn", stats.avg_order_value.display(), None),
        StatCard::new(
            "Khách hàng mới",
            format_count(stats.new_customers),
            Some(stats.customers_change),
        ),
    ]
}

// =============================================================================
// Recent orders and top products
// =============================================================================

/// Status pill with the Vietnamese label used on the dashboard.
#[must_use]
pub fn dashboard_status_badge(status: OrderStatus) -> Badge {
    match status {
        OrderStatus::Pending => Badge::status("pending", "Chờ Xử Lý"),
        OrderStatus::Confirmed => Badge::status("processing", "Đã Xác Nhận"),
        OrderStatus::Processing => Badge::status("processing", "Đang Xử Lý"),
        OrderStatus::Shipped => Badge::status("delivered", "Đang Giao"),
        OrderStatus::Delivered => Badge::status("active", "Đã Giao"),
        OrderStatus::Cancelled => Badge::status("cancelled", "Đã Hủy"),
        OrderStatus::Unknown => Badge::status("pending", status.as_str()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentOrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub order_date: String,
    pub total: String,
    pub status: Badge,
}

impl From<&Order> for RecentOrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i64(),
            order_number: order.order_number.clone(),
            customer_name: text_or(order.customer_name.as_deref(), "Khách"),
            customer_email: text_or(order.customer_email.as_deref(), ""),
            order_date: format_datetime_or(order.order_date.as_ref(), ""),
            total: order.total_amount.display(),
            status: dashboard_status_badge(order.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProductRow {
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub price: String,
    pub stock: String,
}

impl From<&TopProduct> for TopProductRow {
    fn from(product: &TopProduct) -> Self {
        Self {
            name: product.name.clone(),
            image_url: image_or_placeholder(product.image_url.as_deref()),
            category: text_or(product.category.as_deref(), "N/A"),
            price: product.price.display(),
            stock: format!("{} đơn vị", product.stock),
        }
    }
}

// =============================================================================
// DashboardView
// =============================================================================

#[derive(Debug, Clone, Template)]
#[template(path = "dashboard/dashboard.html")]
pub struct DashboardView {
    pub period: String,
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<RecentOrderRow>,
    pub top_products: Vec<TopProductRow>,
    /// Sections that failed to load.
    pub notices: Vec<Notice>,
}

impl DashboardView {
    /// Assemble the view from already-fetched sections.
    #[must_use]
    pub fn new(
        period: &str,
        stats: &DashboardStats,
        recent_orders: &[Order],
        top_products: &[TopProduct],
    ) -> Self {
        Self {
            period: period.to_string(),
            stats: stat_cards(stats),
            recent_orders: recent_orders.iter().map(RecentOrderRow::from).collect(),
            top_products: top_products.iter().map(TopProductRow::from).collect(),
            notices: Vec::new(),
        }
    }

    /// Fetch every section for `period` and build the view.
    #[instrument(skip(client))]
    pub async fn load(client: &AdminApiClient, period: &str) -> Self {
        let (stats, orders, products) = tokio::join!(
            client.dashboard_stats(period),
            client.recent_orders(RECENT_ORDERS_LIMIT),
            client.top_products(TOP_PRODUCTS_LIMIT),
        );

        let mut notices = Vec::new();
        let stats = stats.unwrap_or_else(|e| {
            notices.push(Notice::from_api_error("Lỗi khi tải thống kê", &e));
            DashboardStats::default()
        });
        let orders = orders.unwrap_or_else(|e| {
            notices.push(Notice::from_api_error("Lỗi khi tải đơn hàng gần đây", &e));
            Vec::new()
        });
        let products = products.unwrap_or_else(|e| {
            notices.push(Notice::from_api_error("Lỗi khi tải sản phẩm bán chạy", &e));
            Vec::new()
        });

        let mut view = Self::new(period, &stats, &orders, &products);
        view.notices = notices;
        view
    }
}
