//! Reusable admin UI components.

pub mod pagination;

pub use pagination::{PageButton, PaginationView};
