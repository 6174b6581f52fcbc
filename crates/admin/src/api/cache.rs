//! Cache types for lookup lists.

use std::sync::Arc;

use super::types::LookupOption;

/// Cache key for lookup lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ActiveCategories,
    ActiveSuppliers,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Lookup(Arc<Vec<LookupOption>>),
}
