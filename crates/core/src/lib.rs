//! Dacsan Core - Shared types library.
//!
//! This crate provides common types used across all Dacsan components:
//! - `storefront` - Browser-local cart store and its storage/sync plumbing
//! - `admin` - Back-office list controllers over the admin JSON API
//! - `cli` - Command-line tools for the cart and admin lists
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, VND prices, statuses, the cart model and page envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
