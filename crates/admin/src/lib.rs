//! Dacsan Admin library.
//!
//! Back-office glue over the admin JSON API:
//! - [`api`] - REST client with cached lookup lists
//! - [`listing`] - one paginated list controller for every entity
//! - [`views`] - typed row view-models and their templates, plus the dashboard
//! - [`components`] - the pagination bar
//! - [`search`] - debounced search input
//! - [`notice`] - transient user-facing notices
//!
//! Failures never retry: they surface as a [`Notice`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod listing;
pub mod notice;
pub mod search;
pub mod views;

pub use api::{AdminApiClient, ApiError};
pub use config::{AdminConfig, ConfigError};
pub use error::AdminError;
pub use listing::{ListController, ListQuery, Resource};
pub use notice::{Notice, NoticeKind, NoticeView};
