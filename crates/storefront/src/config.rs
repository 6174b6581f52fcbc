//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory of the file-backed cart storage (default: .dacsan)
//! - `CART_STORAGE_KEY` - Storage key of the cart document (default: `shopping_cart`)
//! - `CART_WRITE_POLICY` - `last-write-wins` (default) or `compare-and-swap`
//! - `CART_QUOTA_BYTES` - Byte quota of the storage partition (default: unbounded)

use std::path::PathBuf;

use thiserror::Error;

use crate::cart::{CART_KEY, CartStoreOptions, WritePolicy};
use crate::error::StorageError;
use crate::storage::{FileStore, Partition};

const DEFAULT_STORAGE_DIR: &str = ".dacsan";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding one JSON document per storage key
    pub storage_dir: PathBuf,
    /// Key the cart document is stored under
    pub storage_key: String,
    /// Commit strategy for cart mutations
    pub write_policy: WritePolicy,
    /// Byte quota of the partition
    pub quota_bytes: Option<usize>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: CART_KEY.to_string(),
            write_policy: WritePolicy::default(),
            quota_bytes: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "CART_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));
        let storage_key = get_env_or_default(&lookup, "CART_STORAGE_KEY", CART_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let write_policy = get_env_or_default(&lookup, "CART_WRITE_POLICY", "last-write-wins")
            .parse::<WritePolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_WRITE_POLICY".to_string(), e))?;
        let quota_bytes = get_optional_env(&lookup, "CART_QUOTA_BYTES")
            .map(|v| {
                v.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CART_QUOTA_BYTES".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            storage_dir,
            storage_key,
            write_policy,
            quota_bytes,
        })
    }

    /// Options for a [`CartStore`](crate::CartStore) built from this configuration.
    #[must_use]
    pub fn store_options(&self) -> CartStoreOptions {
        CartStoreOptions {
            key: self.storage_key.clone(),
            write_policy: self.write_policy,
            ..CartStoreOptions::default()
        }
    }

    /// Open the file-backed partition described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn open_partition(&self) -> Result<Partition, StorageError> {
        let store = FileStore::open(&self.storage_dir)?;
        let store = match self.quota_bytes {
            Some(quota) => store.with_quota(quota),
            None => store,
        };
        Ok(Partition::new(store))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}
