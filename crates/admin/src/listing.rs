//! Generic paginated list controller.
//!
//! Every admin list (orders, products, categories, ...) is the same loop:
//! build query parameters from the current filters, fetch one page, render
//! the rows and the pagination bar. [`Resource`] describes what differs per
//! entity; [`ListController`] does the rest.

use std::collections::BTreeMap;

use askama::Template;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use tracing::{error, instrument};

use dacsan_core::{Page, PageRequest};

use crate::api::AdminApiClient;
use crate::components::PaginationView;
use crate::notice::Notice;

/// One kind of admin list.
pub trait Resource {
    /// Row type as returned by the API.
    type Item: DeserializeOwned + Send;
    /// Table body template rendered from a page of rows.
    type Table: Template;

    /// List endpoint, relative to the API base URL.
    const ENDPOINT: &'static str;
    /// Query parameter carrying the status filter.
    const STATUS_PARAM: &'static str;
    /// Notice shown when a page fails to load.
    const LOAD_ERROR: &'static str;

    /// Build the table for a page of rows. `now` is the server-local time
    /// used for time-dependent badges.
    fn table(items: &[Self::Item], now: NaiveDateTime) -> Self::Table;
}

/// Current filters and page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    size: u32,
    search: String,
    status: String,
    filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// First page, no filters.
    #[must_use]
    pub fn new(size: u32) -> Self {
        Self {
            page: 1,
            size: size.max(1),
            search: String::new(),
            status: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Move to `page` if it exists. Returns false (and changes nothing) for
    /// pages outside `1..=total_pages`.
    pub fn go_to(&mut self, page: u32, total_pages: u32) -> bool {
        if page < 1 || page > total_pages {
            return false;
        }
        self.page = page;
        true
    }

    /// Set the search term and go back to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into().trim().to_string();
        self.page = 1;
    }

    /// Set the status filter (empty for all) and go back to page 1.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into().trim().to_string();
        self.page = 1;
    }

    /// Set an extra filter (empty value clears it) and go back to page 1.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into().trim().to_string();
        if value.is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, value);
        }
        self.page = 1;
    }

    /// Query parameters for a request, with a zero-based page index.
    /// Empty filters are left out.
    #[must_use]
    pub fn params<'a>(&'a self, status_param: &'a str) -> Vec<(&'a str, String)> {
        let request = PageRequest::from_display_page(self.page, self.size);
        let mut params = vec![
            ("page", request.page.to_string()),
            ("size", request.size.to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if !self.status.is_empty() {
            params.push((status_param, self.status.clone()));
        }
        params.extend(self.filters.iter().map(|(k, v)| (k.as_str(), v.clone())));
        params
    }
}

/// Drives one admin list against the REST API.
pub struct ListController<R: Resource> {
    client: AdminApiClient,
    query: ListQuery,
    page: Page<R::Item>,
}

impl<R: Resource> std::fmt::Debug for ListController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("endpoint", &R::ENDPOINT)
            .field("query", &self.query)
            .field("rows", &self.page.content.len())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ListController<R> {
    #[must_use]
    pub fn new(client: AdminApiClient, page_size: u32) -> Self {
        Self {
            client,
            query: ListQuery::new(page_size),
            page: Page::empty(),
        }
    }

    /// Start from a prepared query instead of the first unfiltered page.
    #[must_use]
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    /// The last page loaded successfully.
    #[must_use]
    pub const fn page(&self) -> &Page<R::Item> {
        &self.page
    }

    #[must_use]
    pub fn items(&self) -> &[R::Item] {
        &self.page.content
    }

    /// Fetch the page the query points at.
    ///
    /// On failure the previous page stays in place.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if the request fails.
    #[instrument(skip(self), fields(endpoint = R::ENDPOINT, page = self.query.page()))]
    pub async fn load(&mut self) -> Result<(), Notice> {
        let params = self.query.params(R::STATUS_PARAM);
        match self.client.list::<R::Item>(R::ENDPOINT, &params).await {
            Ok(page) => {
                self.page = page;
                Ok(())
            }
            Err(e) => Err(Notice::from_api_error(R::LOAD_ERROR, &e)),
        }
    }

    /// Go to a one-based page; out-of-range pages are ignored.
    ///
    /// On failure the query stays on the page still shown.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if the request fails.
    pub async fn change_page(&mut self, page: u32) -> Result<(), Notice> {
        let shown = self.query.page;
        if !self.query.go_to(page, self.page.total_pages) {
            return Ok(());
        }
        let result = self.load().await;
        if result.is_err() {
            self.query.page = shown;
        }
        result
    }

    /// Apply a settled search term and reload from page 1.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if the request fails.
    pub async fn search(&mut self, term: impl Into<String>) -> Result<(), Notice> {
        self.query.set_search(term);
        self.load().await
    }

    /// Apply a status filter and reload from page 1.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if the request fails.
    pub async fn filter_status(&mut self, status: impl Into<String>) -> Result<(), Notice> {
        self.query.set_status(status);
        self.load().await
    }

    /// Apply an extra filter (e.g. `categoryId`, `startDate`) and reload
    /// from page 1.
    ///
    /// # Errors
    ///
    /// Returns the notice to show if the request fails.
    pub async fn filter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Notice> {
        self.query.set_filter(key, value);
        self.load().await
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationView {
        PaginationView::new(
            self.query.page(),
            self.page.total_pages,
            self.page.total_elements,
            self.query.size(),
        )
    }

    #[must_use]
    pub fn table(&self, now: NaiveDateTime) -> R::Table {
        R::table(&self.page.content, now)
    }

    /// Table body followed by the pagination bar.
    #[must_use]
    pub fn render(&self, now: NaiveDateTime) -> String {
        let table = self.table(now).render();
        let pagination = self.pagination().render();
        match (table, pagination) {
            (Ok(table), Ok(pagination)) => format!("{table}\n{pagination}"),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, endpoint = R::ENDPOINT, "Failed to render list");
                String::new()
            }
        }
    }
}
