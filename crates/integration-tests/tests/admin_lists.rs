//! Integration tests for the admin list controller.
//!
//! Every test runs against its own fixture server, so the recorded requests
//! are exactly the ones the test caused.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use dacsan_admin::ListController;
use dacsan_admin::views::{CategoryResource, OrderResource};
use dacsan_integration_tests::{FixtureData, FixtureServer, sample_categories, sample_orders};

const ORDERS_PATH: &str = "api/admin/orders";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 31)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

async fn orders_fixture(count: i64) -> FixtureServer {
    FixtureServer::start(FixtureData {
        orders: sample_orders(count),
        ..FixtureData::default()
    })
    .await
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_pages_are_requested_zero_based() {
    let fixture = orders_fixture(25).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);

    orders.load().await.unwrap();
    let first = fixture.requests_to(ORDERS_PATH);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].param("page"), Some("0"));
    assert_eq!(first[0].param("size"), Some("10"));
    assert_eq!(first[0].param("search"), None);
    assert_eq!(first[0].param("status"), None);

    let pagination = orders.pagination();
    assert_eq!(pagination.current, 1);
    assert_eq!(pagination.total_pages, 3);
    assert_eq!(pagination.total_elements, 25);

    orders.change_page(3).await.unwrap();
    let last = fixture.requests_to(ORDERS_PATH);
    assert_eq!(last[1].param("page"), Some("2"));
    assert_eq!(orders.items().len(), 5);

    let pagination = orders.pagination();
    assert_eq!(pagination.current, 3);
    assert_eq!(pagination.showing_start, 21);
    assert_eq!(pagination.showing_end, 25);
    assert!(pagination.next_disabled);
}

#[tokio::test]
async fn test_out_of_range_page_sends_nothing() {
    let fixture = orders_fixture(25).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    orders.load().await.unwrap();

    orders.change_page(0).await.unwrap();
    orders.change_page(4).await.unwrap();

    assert_eq!(fixture.requests_to(ORDERS_PATH).len(), 1);
    assert_eq!(orders.query().page(), 1);
}

#[tokio::test]
async fn test_empty_list_renders_empty_state() {
    let fixture = orders_fixture(0).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    orders.load().await.unwrap();

    assert_eq!(orders.pagination().showing_start, 0);
    assert!(orders.render(now()).contains("Không tìm thấy đơn hàng"));
}

// ============================================================================
// Search & filters
// ============================================================================

#[tokio::test]
async fn test_search_resets_to_first_page() {
    let fixture = orders_fixture(25).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    orders.load().await.unwrap();
    orders.change_page(2).await.unwrap();

    orders.search("  dh001 ").await.unwrap();

    let last = fixture.requests_to(ORDERS_PATH).pop().unwrap();
    assert_eq!(last.param("page"), Some("0"));
    assert_eq!(last.param("search"), Some("dh001"));
    assert_eq!(orders.page().total_elements, 10);
    assert_eq!(orders.query().page(), 1);
}

#[tokio::test]
async fn test_status_filter_uses_resource_parameter() {
    let fixture = orders_fixture(25).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    orders.filter_status("SHIPPED").await.unwrap();

    let last = fixture.requests_to(ORDERS_PATH).pop().unwrap();
    assert_eq!(last.param("status"), Some("SHIPPED"));
    assert_eq!(orders.items().len(), 6);
    assert!(orders.render(now()).contains("DH0002"));

    let categories_fixture = FixtureServer::start(FixtureData {
        categories: sample_categories(),
        ..FixtureData::default()
    })
    .await;
    let mut categories = ListController::<CategoryResource>::new(categories_fixture.client(), 10);
    categories.filter_status("true").await.unwrap();

    let last = categories_fixture
        .requests_to("admin/categories/list")
        .pop()
        .unwrap();
    assert_eq!(last.param("isActive"), Some("true"));
    assert_eq!(last.param("status"), None);
    assert_eq!(categories.items().len(), 2);
}

#[tokio::test]
async fn test_blank_filters_are_not_sent() {
    let fixture = orders_fixture(5).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);

    orders.filter("startDate", "2024-12-01").await.unwrap();
    orders.filter("endDate", "2024-12-31").await.unwrap();
    let last = fixture.requests_to(ORDERS_PATH).pop().unwrap();
    assert_eq!(last.param("startDate"), Some("2024-12-01"));
    assert_eq!(last.param("endDate"), Some("2024-12-31"));

    orders.filter("startDate", "").await.unwrap();
    let last = fixture.requests_to(ORDERS_PATH).pop().unwrap();
    assert_eq!(last.param("startDate"), None);
    assert_eq!(last.param("endDate"), Some("2024-12-31"));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failed_load_keeps_previous_page() {
    let fixture = orders_fixture(25).await;
    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    orders.load().await.unwrap();

    fixture.fail(
        ORDERS_PATH,
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Máy chủ đang bận" }),
    );
    let notice = orders.change_page(2).await.unwrap_err();
    assert!(notice.is_error());
    assert_eq!(notice.message, "Máy chủ đang bận");

    assert_eq!(orders.page().number, Some(0));
    assert_eq!(orders.items()[0].order_number, "DH0001");
    assert_eq!(orders.query().page(), 1);
    assert_eq!(orders.pagination().current, 1);
    assert!(orders.render(now()).contains("DH0001"));

    fixture.recover(ORDERS_PATH);
    orders.load().await.unwrap();
    assert_eq!(orders.items()[0].order_number, "DH0001");
    orders.change_page(2).await.unwrap();
    assert_eq!(orders.items()[0].order_number, "DH0011");
}

#[tokio::test]
async fn test_failure_without_message_uses_fallback() {
    let fixture = orders_fixture(5).await;
    fixture.fail(ORDERS_PATH, StatusCode::BAD_GATEWAY, serde_json::Value::Null);

    let mut orders = ListController::<OrderResource>::new(fixture.client(), 10);
    let notice = orders.load().await.unwrap_err();
    assert_eq!(notice.message, "Lỗi khi tải danh sách đơn hàng");
    assert!(orders.items().is_empty());
}
