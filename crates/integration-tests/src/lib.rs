//! Integration tests for Dacsan.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dacsan-integration-tests
//! ```
//!
//! No external services are needed: admin tests run against
//! [`FixtureServer`], an in-process stand-in for the admin REST API bound
//! to an ephemeral local port. Storefront tests use in-memory or temporary
//! file-backed storage.
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart sharing between contexts and persistence
//! - `admin_lists` - Paginated lists, filters and failure notices
//! - `admin_actions` - Order detail, status updates, lookups and dashboard

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use dacsan_admin::{AdminApiClient, AdminConfig};

// ============================================================================
// Recorded traffic
// ============================================================================

/// One request the fixture received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the leading slash, e.g. `api/admin/orders`.
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl RecordedRequest {
    /// A query parameter's value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Data the fixture serves, and what it has seen.
#[derive(Debug, Default)]
pub struct FixtureData {
    pub orders: Vec<Value>,
    pub categories: Vec<Value>,
    pub promotions: Vec<Value>,
    pub stats: Value,
    pub top_products: Vec<Value>,
    /// Canned error responses keyed by path.
    pub failures: HashMap<String, (StatusCode, Value)>,
    pub requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<FixtureData>>;

fn lock(data: &Shared) -> MutexGuard<'_, FixtureData> {
    data.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Server
// ============================================================================

/// Admin REST API stand-in serving [`FixtureData`] on `127.0.0.1`.
///
/// The server task is aborted when the fixture is dropped.
#[derive(Debug)]
pub struct FixtureServer {
    base_url: Url,
    data: Shared,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    /// Bind an ephemeral port and start serving `data`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(data: FixtureData) -> Self {
        let data: Shared = Arc::new(Mutex::new(data));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fixture listener");
        let addr = listener.local_addr().expect("Fixture listener has no address");

        let app = router(Arc::clone(&data));
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                panic!("Fixture server failed: {e}");
            }
        });

        let base_url = Url::parse(&format!("http://{addr}/")).expect("Fixture URL is valid");
        Self {
            base_url,
            data,
            handle,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Admin configuration pointing at this fixture.
    #[must_use]
    pub fn config(&self) -> AdminConfig {
        AdminConfig::new(self.base_url.clone())
    }

    /// A fresh client for this fixture.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> AdminApiClient {
        AdminApiClient::new(&self.config()).expect("Failed to build admin client")
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.data).requests.clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Answer every request for `path` with `status` and `body`; a null
    /// body is sent as an empty one.
    pub fn fail(&self, path: &str, status: StatusCode, body: Value) {
        lock(&self.data)
            .failures
            .insert(path.to_string(), (status, body));
    }

    /// Serve `path` normally again.
    pub fn recover(&self, path: &str) {
        lock(&self.data).failures.remove(path);
    }

    /// Inspect or change the served data.
    pub fn with_data<T>(&self, f: impl FnOnce(&mut FixtureData) -> T) -> T {
        f(&mut lock(&self.data))
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(data: Shared) -> Router {
    Router::new()
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/{id}", get(get_order))
        .route("/api/admin/orders/{id}/status", put(update_order_status))
        .route("/admin/categories/list", get(list_categories))
        .route("/admin/categories/{id}/toggle-active", patch(toggle_category))
        .route("/api/categories/active", get(active_categories))
        .route("/admin/promotions/api/list", get(list_promotions))
        .route("/admin/dashboard/stats", get(dashboard_stats))
        .route("/admin/dashboard/recent-orders", get(recent_orders))
        .route("/admin/dashboard/top-products", get(top_products))
        .layer(middleware::from_fn_with_state(Arc::clone(&data), record))
        .with_state(data)
}

/// Record the request, then answer with a canned failure if one is set.
async fn record(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let path = request.uri().path().trim_start_matches('/').to_string();
    let query = request
        .uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let failure = {
        let mut data = lock(&data);
        data.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: path.clone(),
            query,
        });
        data.failures.get(&path).cloned()
    };

    match failure {
        Some((status, Value::Null)) => status.into_response(),
        Some((status, body)) => (status, Json(body)).into_response(),
        None => next.run(request).await,
    }
}

// ============================================================================
// Handlers
// ============================================================================

type Params = Query<HashMap<String, String>>;

async fn list_orders(State(data): State<Shared>, Query(params): Params) -> Json<Value> {
    Json(paginate(&lock(&data).orders, &params, "status", "orderNumber"))
}

async fn list_categories(State(data): State<Shared>, Query(params): Params) -> Json<Value> {
    Json(paginate(&lock(&data).categories, &params, "isActive", "name"))
}

async fn list_promotions(State(data): State<Shared>, Query(params): Params) -> Json<Value> {
    Json(paginate(&lock(&data).promotions, &params, "status", "code"))
}

async fn get_order(State(data): State<Shared>, Path(id): Path<i64>) -> Response {
    let data = lock(&data);
    match data.orders.iter().find(|o| o["id"] == id) {
        Some(order) => Json(order.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Không tìm thấy đơn hàng" })),
        )
            .into_response(),
    }
}

async fn update_order_status(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut data = lock(&data);
    match data.orders.iter_mut().find(|o| o["id"] == id) {
        Some(order) => {
            order["status"] = body["status"].clone();
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn toggle_category(State(data): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut data = lock(&data);
    match data.categories.iter_mut().find(|c| c["id"] == id) {
        Some(category) => {
            let active = category["isActive"].as_bool().unwrap_or(false);
            category["isActive"] = Value::Bool(!active);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn active_categories(State(data): State<Shared>) -> Json<Value> {
    let active: Vec<Value> = lock(&data)
        .categories
        .iter()
        .filter(|c| c["isActive"].as_bool().unwrap_or(false))
        .map(|c| json!({ "id": c["id"], "name": c["name"] }))
        .collect();
    Json(Value::Array(active))
}

async fn dashboard_stats(State(data): State<Shared>) -> Json<Value> {
    Json(lock(&data).stats.clone())
}

/// Recent orders, newest first, with a null entry the client must skip.
async fn recent_orders(State(data): State<Shared>, Query(params): Params) -> Json<Value> {
    let limit = limit(&params);
    let mut orders: Vec<Value> = lock(&data).orders.iter().rev().take(limit).cloned().collect();
    orders.push(Value::Null);
    Json(Value::Array(orders))
}

async fn top_products(State(data): State<Shared>, Query(params): Params) -> Json<Value> {
    let limit = limit(&params);
    Json(Value::Array(
        lock(&data).top_products.iter().take(limit).cloned().collect(),
    ))
}

fn limit(params: &HashMap<String, String>) -> usize {
    params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(usize::MAX)
}

/// Filter `rows` like the API does and cut the zero-based `page`.
fn paginate(
    rows: &[Value],
    params: &HashMap<String, String>,
    status_param: &str,
    search_field: &str,
) -> Value {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: usize = params
        .get("size")
        .and_then(|s| s.parse().ok())
        .filter(|s| *s > 0)
        .unwrap_or(10);
    let search = params.get("search").map(|s| s.to_lowercase());
    let status = params.get(status_param);

    let matching: Vec<&Value> = rows
        .iter()
        .filter(|row| {
            search.as_ref().is_none_or(|term| {
                row[search_field]
                    .as_str()
                    .is_some_and(|v| v.to_lowercase().contains(term))
            })
        })
        .filter(|row| status.is_none_or(|wanted| field_text(&row[status_param]) == *wanted))
        .collect();

    let total = matching.len();
    let content: Vec<Value> = matching
        .into_iter()
        .skip(page * size)
        .take(size)
        .cloned()
        .collect();

    json!({
        "content": content,
        "totalPages": total.div_ceil(size),
        "totalElements": total,
        "number": page,
        "size": size,
    })
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Sample data
// ============================================================================

/// `count` orders numbered `DH0001..`, cycling through a few statuses.
#[must_use]
pub fn sample_orders(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            let status = match id % 4 {
                0 => "PENDING",
                1 => "PROCESSING",
                2 => "SHIPPED",
                _ => "DELIVERED",
            };
            json!({
                "id": id,
                "orderNumber": format!("DH{id:04}"),
                "customerName": format!("Khách hàng {id}"),
                "customerEmail": format!("khach{id}@example.vn"),
                "orderDate": format!("2024-12-{:02}T09:30:00", (id % 28) + 1),
                "totalAmount": 100_000 + id * 5_000,
                "shippingFee": 30_000,
                "shippingAddressText": "12 Lý Thường Kiệt, Hà Nội",
                "status": status,
                "paymentStatus": "COMPLETED",
                "orderItems": [{
                    "productName": "Mứt gừng",
                    "quantity": 2,
                    "unitPrice": 35_000 + id * 2_500,
                    "totalPrice": 70_000 + id * 5_000,
                }],
            })
        })
        .collect()
}

/// Categories with every other one inactive.
#[must_use]
pub fn sample_categories() -> Vec<Value> {
    ["Bánh kẹo", "Mứt", "Trà", "Đặc sản khô"]
        .iter()
        .zip(1_i64..)
        .map(|(name, id)| {
            json!({
                "id": id,
                "name": name,
                "description": format!("Danh mục {name}"),
                "imageUrl": null,
                "productCount": id * 3,
                "isActive": id % 2 == 1,
                "createdAt": "2024-01-15T08:00:00",
            })
        })
        .collect()
}

/// Dashboard headline numbers.
#[must_use]
pub fn sample_stats() -> Value {
    json!({
        "totalRevenue": 12_500_000,
        "totalOrders": 1_234,
        "avgOrderValue": 250_000,
        "newCustomers": 56,
        "revenueChange": 12.5,
        "ordersChange": -3.2,
        "customersChange": 0,
    })
}

#[must_use]
pub fn sample_top_products() -> Vec<Value> {
    (1..=6)
        .map(|i| {
            json!({
                "name": format!("Sản phẩm {i}"),
                "imageUrl": null,
                "category": "Mứt",
                "price": 50_000 * i,
                "stock": 20 - i,
            })
        })
        .collect()
}
