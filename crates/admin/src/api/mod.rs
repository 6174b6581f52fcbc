//! Client for the admin REST API.
//!
//! Plain JSON over `reqwest`, with an optional bearer token and a request
//! timeout. The active-categories and active-suppliers lookup lists are
//! cached for 5 minutes using `moka` and invalidated by writes that can
//! change them.

mod cache;
mod error;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use dacsan_core::{CategoryId, OrderId, OrderStatus, Page, ProductId, PromotionId, SupplierId};

use crate::config::AdminConfig;

use cache::{CacheKey, CacheValue};
pub use error::ApiError;
use error::message_from_body;
use types::{
    DashboardStats, LookupOption, Order, OrderStatusUpdate, Promotion, PromotionInput, Supplier,
    SupplierInput, TopProduct,
};

// =============================================================================
// Endpoints
// =============================================================================

pub const ORDERS: &str = "api/admin/orders";
pub const PRODUCTS: &str = "api/inventory/products";
pub const CATEGORIES: &str = "admin/categories/list";
pub const SUPPLIERS: &str = "admin/suppliers/list";
pub const PROMOTIONS: &str = "admin/promotions/api/list";
pub const CUSTOMERS: &str = "api/admin/users";

const ACTIVE_CATEGORIES: &str = "api/categories/active";
const ACTIVE_SUPPLIERS: &str = "admin/suppliers/active";

// =============================================================================
// AdminApiClient
// =============================================================================

/// Client for the admin REST API.
#[derive(Clone)]
pub struct AdminApiClient {
    inner: Arc<AdminApiClientInner>,
}

struct AdminApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for AdminApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AdminApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(AdminApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                token: config.bearer_token().map(str::to_string),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and return the raw success body.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let mut request = self.inner.client.request(method.clone(), url.clone());
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                %method,
                url = %url.path(),
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Admin API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: message_from_body(&text),
            });
        }

        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, params)?;
        let text = self.send::<()>(Method::GET, url, None).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse admin API response"
            );
            ApiError::Parse(e)
        })
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        self.send(method, url, body).await.map(|_| ())
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Fetch one page of a list endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a page.
    #[instrument(skip(self, params))]
    pub async fn list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Page<T>, ApiError> {
        let page: Page<T> = self.get_json(endpoint, params).await?;
        debug!(
            rows = page.content.len(),
            total = page.total_elements,
            "Fetched list page"
        );
        Ok(page)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Get one order with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get_json(&format!("{ORDERS}/{id}"), &[]).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
        if status == OrderStatus::Unknown {
            return Err(ApiError::Invalid("unknown order status".to_string()));
        }
        self.execute(
            Method::PUT,
            &format!("{ORDERS}/{id}/status"),
            Some(&OrderStatusUpdate { status }),
        )
        .await
    }

    // =========================================================================
    // Products & categories
    // =========================================================================

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, &format!("api/products/{id}"), None)
            .await
    }

    /// Active categories, for filter dropdowns.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn active_categories(&self) -> Result<Arc<Vec<LookupOption>>, ApiError> {
        self.lookup(CacheKey::ActiveCategories, ACTIVE_CATEGORIES).await
    }

    /// Flip a category's active flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn toggle_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.execute::<()>(
            Method::PATCH,
            &format!("admin/categories/{id}/toggle-active"),
            None,
        )
        .await?;
        self.inner.cache.invalidate(&CacheKey::ActiveCategories).await;
        Ok(())
    }

    /// Delete a category. Categories that still hold products are refused
    /// without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not empty or the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId, product_count: u64) -> Result<(), ApiError> {
        if product_count > 0 {
            return Err(ApiError::Invalid(format!(
                "Không thể xóa danh mục có {product_count} sản phẩm"
            )));
        }
        self.execute::<()>(Method::DELETE, &format!("admin/categories/{id}"), None)
            .await?;
        self.inner.cache.invalidate(&CacheKey::ActiveCategories).await;
        Ok(())
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Get one supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier is not found or the request fails.
    #[instrument(skip(self), fields(supplier_id = %id))]
    pub async fn get_supplier(&self, id: SupplierId) -> Result<Supplier, ApiError> {
        self.get_json(&format!("admin/suppliers/{id}"), &[]).await
    }

    /// Create (`id` is `None`) or update a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn save_supplier(
        &self,
        id: Option<SupplierId>,
        input: SupplierInput,
    ) -> Result<(), ApiError> {
        let input = input.trimmed();
        if input.name.is_empty() {
            return Err(ApiError::Invalid("Vui lòng nhập tên nhà phân phối".to_string()));
        }
        match id {
            Some(id) => {
                self.execute(Method::PUT, &format!("admin/suppliers/{id}"), Some(&input))
                    .await?;
            }
            None => {
                self.execute(Method::POST, "admin/suppliers", Some(&input))
                    .await?;
            }
        }
        self.inner.cache.invalidate(&CacheKey::ActiveSuppliers).await;
        Ok(())
    }

    /// Delete a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(supplier_id = %id))]
    pub async fn delete_supplier(&self, id: SupplierId) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, &format!("admin/suppliers/{id}"), None)
            .await?;
        self.inner.cache.invalidate(&CacheKey::ActiveSuppliers).await;
        Ok(())
    }

    /// Active suppliers, for product forms.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn active_suppliers(&self) -> Result<Arc<Vec<LookupOption>>, ApiError> {
        self.lookup(CacheKey::ActiveSuppliers, ACTIVE_SUPPLIERS).await
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    /// Get one promotion.
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found or the request fails.
    #[instrument(skip(self), fields(promotion_id = %id))]
    pub async fn get_promotion(&self, id: PromotionId) -> Result<Promotion, ApiError> {
        self.get_json(&format!("admin/promotions/api/{id}"), &[]).await
    }

    /// Create (`id` is `None`) or update a promotion after validating it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Invalid` if the input breaks a form rule, or an
    /// error if the request fails.
    #[instrument(skip(self, input))]
    pub async fn save_promotion(
        &self,
        id: Option<PromotionId>,
        input: PromotionInput,
    ) -> Result<(), ApiError> {
        let input = input.validated().map_err(ApiError::Invalid)?;
        match id {
            Some(id) => {
                self.execute(Method::PUT, &format!("admin/promotions/api/{id}"), Some(&input))
                    .await
            }
            None => {
                self.execute(Method::POST, "admin/promotions/api/create", Some(&input))
                    .await
            }
        }
    }

    /// Flip a promotion's active flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(promotion_id = %id))]
    pub async fn toggle_promotion(&self, id: PromotionId) -> Result<(), ApiError> {
        self.execute::<()>(
            Method::PUT,
            &format!("admin/promotions/api/{id}/toggle"),
            None,
        )
        .await
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(promotion_id = %id))]
    pub async fn delete_promotion(&self, id: PromotionId) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, &format!("admin/promotions/api/{id}"), None)
            .await
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Headline statistics for a reporting period (e.g. `30days`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self, period: &str) -> Result<DashboardStats, ApiError> {
        self.get_json("admin/dashboard/stats", &[("period", period.to_string())])
            .await
    }

    /// Most recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn recent_orders(&self, limit: u32) -> Result<Vec<Order>, ApiError> {
        let orders: Vec<Option<Order>> = self
            .get_json("admin/dashboard/recent-orders", &[("limit", limit.to_string())])
            .await?;
        Ok(orders.into_iter().flatten().collect())
    }

    /// Best-selling products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, ApiError> {
        self.get_json("admin/dashboard/top-products", &[("limit", limit.to_string())])
            .await
    }

    // =========================================================================
    // Cached lookups
    // =========================================================================

    async fn lookup(
        &self,
        key: CacheKey,
        path: &str,
    ) -> Result<Arc<Vec<LookupOption>>, ApiError> {
        if let Some(CacheValue::Lookup(options)) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for lookup list");
            return Ok(options);
        }

        let options: Arc<Vec<LookupOption>> = Arc::new(self.get_json(path, &[]).await?);
        self.inner
            .cache
            .insert(key, CacheValue::Lookup(Arc::clone(&options)))
            .await;
        Ok(options)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdminApiClient {
        AdminApiClient::new(&AdminConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_under_base_path() {
        let client = client("https://shop.example.vn/backoffice");
        let url = client
            .url(
                ORDERS,
                &[("page", "0".to_string()), ("search", "Nguyễn Văn".to_string())],
            )
            .unwrap();
        assert_eq!(url.path(), "/backoffice/api/admin/orders");
        assert_eq!(url.query(), Some("page=0&search=Nguy%E1%BB%85n+V%C4%83n"));
    }

    #[test]
    fn test_url_without_params_has_no_query() {
        let client = client("http://localhost:8080");
        let url = client.url("/admin/suppliers/active", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/admin/suppliers/active");
    }

    #[tokio::test]
    async fn test_update_to_unknown_status_is_refused_locally() {
        let client = client("http://127.0.0.1:9");
        let err = client
            .update_order_status(OrderId::new(1), OrderStatus::Unknown)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_delete_non_empty_category_is_refused_locally() {
        let client = client("http://127.0.0.1:9");
        let err = client
            .delete_category(CategoryId::new(3), 4)
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Không thể xóa danh mục có 4 sản phẩm"));
    }
}
