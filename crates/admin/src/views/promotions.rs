//! Promotion rows.

use askama::Template;
use chrono::NaiveDateTime;

use dacsan_core::{DiscountType, format_vnd};

use super::{Badge, format_datetime, text_or};
use crate::api::{self, types::Promotion};
use crate::listing::Resource;

/// Where a promotion stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStatus {
    /// Enabled and inside its validity window.
    Active,
    /// Past its end date, enabled or not.
    Expired,
    /// Disabled before its end date.
    Paused,
    /// Enabled but not yet started.
    NotStarted,
}

impl PromotionStatus {
    /// Status of `promotion` at `now` (server-local time).
    ///
    /// Expiry takes precedence over the enabled flag.
    #[must_use]
    pub fn at(promotion: &Promotion, now: NaiveDateTime) -> Self {
        if promotion.is_active && now >= promotion.start_date && now <= promotion.end_date {
            Self::Active
        } else if now > promotion.end_date {
            Self::Expired
        } else if !promotion.is_active {
            Self::Paused
        } else {
            Self::NotStarted
        }
    }

    #[must_use]
    pub fn badge(self) -> Badge {
        match self {
            Self::Active => Badge::status("active", "Đang hoạt động"),
            Self::Expired => Badge::status("cancelled", "Đã hết hạn"),
            Self::Paused => Badge::status("cancelled", "Tạm dừng"),
            Self::NotStarted => Badge::status("pending", "Chưa bắt đầu"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRow {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub discount_type: &'static str,
    pub discount: String,
    pub usage: String,
    pub starts: String,
    pub ends: String,
    pub is_active: bool,
    pub status: Badge,
}

impl PromotionRow {
    #[must_use]
    pub fn new(promotion: &Promotion, now: NaiveDateTime) -> Self {
        let (discount_type, discount) = match promotion.discount_type {
            DiscountType::Percentage => (
                "Phần trăm",
                format!("{}%", promotion.discount_value.normalize()),
            ),
            DiscountType::FixedAmount => ("Số tiền", format_vnd(promotion.discount_value)),
        };
        let usage = match promotion.usage_limit.filter(|limit| *limit > 0) {
            Some(limit) => format!("{}/{limit}", promotion.used_count),
            None => format!("{}/∞", promotion.used_count),
        };

        Self {
            id: promotion.id.as_i64(),
            code: promotion.code.clone(),
            description: text_or(promotion.description.as_deref(), "-"),
            discount_type,
            discount,
            usage,
            starts: format_datetime(&promotion.start_date),
            ends: format!("đến {}", format_datetime(&promotion.end_date)),
            is_active: promotion.is_active,
            status: PromotionStatus::at(promotion, now).badge(),
        }
    }
}

#[derive(Debug, Clone, Template)]
#[template(path = "tables/promotions.html")]
pub struct PromotionsTable {
    pub rows: Vec<PromotionRow>,
}

/// Promotion list: `/admin/promotions/api/list`, filtered by `status`.
#[derive(Debug, Clone, Copy)]
pub struct PromotionResource;

impl Resource for PromotionResource {
    type Item = Promotion;
    type Table = PromotionsTable;

    const ENDPOINT: &'static str = api::PROMOTIONS;
    const STATUS_PARAM: &'static str = "status";
    const LOAD_ERROR: &'static str = "Lỗi khi tải danh sách khuyến mãi";

    fn table(items: &[Promotion], now: NaiveDateTime) -> PromotionsTable {
        PromotionsTable {
            rows: items.iter().map(|p| PromotionRow::new(p, now)).collect(),
        }
    }
}
