//! Wire types of the admin REST API.
//!
//! Field names follow the API's camelCase JSON. Timestamps are the server's
//! local date-times without an offset.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dacsan_core::{
    CategoryId, CustomerId, DiscountType, OrderId, OrderStatus, PaymentStatus, Price, ProductId,
    PromotionId, SupplierId,
};

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "server_time::option")]
    pub order_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_amount: Price,
    pub shipping_fee: Option<Price>,
    pub shipping_address_text: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Price,
    #[serde(default)]
    pub total_price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, deserialize_with = "server_time::option")]
    pub created_at: Option<NaiveDateTime>,
}

/// Entry of an active-categories or active-suppliers lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_code: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Body of a supplier create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub tax_code: String,
    pub description: String,
    pub is_active: bool,
}

impl SupplierInput {
    /// Trim every text field, the way the edit form submits them.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            tax_code: self.tax_code.trim().to_string(),
            description: self.description.trim().to_string(),
            is_active: self.is_active,
        }
    }
}

// =============================================================================
// Promotions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    pub max_discount_amount: Option<Price>,
    pub min_order_value: Option<Price>,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(deserialize_with = "server_time::required")]
    pub start_date: NaiveDateTime,
    #[serde(deserialize_with = "server_time::required")]
    pub end_date: NaiveDateTime,
    #[serde(default)]
    pub is_active: bool,
}

/// Body of a promotion create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    pub max_discount_amount: Option<Price>,
    pub min_order_value: Price,
    pub usage_limit: Option<u32>,
    #[serde(with = "local_minutes")]
    pub start_date: NaiveDateTime,
    #[serde(with = "local_minutes")]
    pub end_date: NaiveDateTime,
    pub is_active: bool,
}

impl PromotionInput {
    /// Check the form rules and normalize the code to upper case.
    ///
    /// # Errors
    ///
    /// Returns the user-facing message of the first rule that fails.
    pub fn validated(mut self) -> Result<Self, String> {
        self.code = self.code.trim().to_uppercase();
        self.description = self.description.trim().to_string();

        if self.code.is_empty() || self.discount_value.is_zero() {
            return Err("Vui lòng điền đầy đủ thông tin bắt buộc".to_string());
        }
        if self.discount_type == DiscountType::Percentage
            && (self.discount_value.is_sign_negative() || self.discount_value > Decimal::ONE_HUNDRED)
        {
            return Err("Giá trị giảm % phải từ 0-100".to_string());
        }
        if self.end_date <= self.start_date {
            return Err("Ngày kết thúc phải sau ngày bắt đầu".to_string());
        }
        Ok(self)
    }
}

/// Server date-times: ISO local date-time with or without seconds, or an
/// RFC 3339 timestamp whose offset is dropped.
mod server_time {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, de::Error};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date-time: {raw}")))
    }

    pub fn option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date-time: {raw}"))))
            .transpose()
    }
}

/// `yyyy-mm-ddThh:mm`, the format of a datetime-local form field.
mod local_minutes {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spent: Price,
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_revenue: Price,
    pub total_orders: u64,
    pub avg_order_value: Price,
    pub new_customers: u64,
    pub revenue_change: f64,
    pub orders_change: f64,
    pub customers_change: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn promotion_input() -> PromotionInput {
        PromotionInput {
            code: " tet2025 ".to_string(),
            description: "Khuyến mãi Tết".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(15),
            max_discount_amount: Some(Price::from_dong(50_000)),
            min_order_value: Price::from_dong(200_000),
            usage_limit: Some(100),
            start_date: "2025-01-20T00:00:00".parse().unwrap(),
            end_date: "2025-02-10T23:59:00".parse().unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_order_deserializes_with_missing_fields() {
        let order: Order = serde_json::from_str(
            r#"{"id":7,"orderNumber":"DH0007","totalAmount":125000,"status":"SHIPPED","orderDate":"2024-03-01T09:15:00"}"#,
        )
        .unwrap();
        assert_eq!(order.id, OrderId::new(7));
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total_amount, Price::from_dong(125_000));
        assert!(order.payment_status.is_none());
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn test_promotion_input_validation() {
        let input = promotion_input().validated().unwrap();
        assert_eq!(input.code, "TET2025");

        let mut too_much = promotion_input();
        too_much.discount_value = Decimal::from(120);
        assert_eq!(too_much.validated().unwrap_err(), "Giá trị giảm % phải từ 0-100");

        let mut backwards = promotion_input();
        backwards.end_date = backwards.start_date;
        assert!(backwards.validated().is_err());

        let mut blank = promotion_input();
        blank.code = "  ".to_string();
        assert!(blank.validated().is_err());
    }

    #[test]
    fn test_promotion_input_wire_format() {
        let json = serde_json::to_value(promotion_input().validated().unwrap()).unwrap();
        assert_eq!(json["code"], "TET2025");
        assert_eq!(json["discountType"], "PERCENTAGE");
        assert_eq!(json["startDate"], "2025-01-20T00:00");
        assert_eq!(json["usageLimit"], 100);
    }

    #[test]
    fn test_server_time_formats() {
        let expected: NaiveDateTime = "2025-01-20T08:30:00".parse().unwrap();
        assert_eq!(server_time::parse("2025-01-20T08:30:00"), Some(expected));
        assert_eq!(server_time::parse("2025-01-20T08:30"), Some(expected));
        assert_eq!(server_time::parse("2025-01-20T08:30:00+07:00"), Some(expected));
        assert_eq!(server_time::parse("20/01/2025"), None);
    }

    #[test]
    fn test_dashboard_stats_defaults() {
        let stats: DashboardStats = serde_json::from_str(r#"{"totalOrders":12}"#).unwrap();
        assert_eq!(stats.total_orders, 12);
        assert_eq!(stats.total_revenue, Price::ZERO);
    }
}
