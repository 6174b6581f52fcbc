//! Core types for Dacsan.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod page;
pub mod price;
pub mod status;

pub use cart::{Cart, CartItem, NewCartItem};
pub use id::*;
pub use page::{Page, PageRequest};
pub use price::{Price, format_vnd};
pub use status::*;
