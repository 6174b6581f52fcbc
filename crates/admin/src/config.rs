//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_API_BASE_URL` - Base URL of the back-office REST API
//!
//! ## Optional
//! - `ADMIN_API_TOKEN` - Bearer token sent with every request
//! - `ADMIN_PAGE_SIZE` - Rows per list page (default: 10)
//! - `ADMIN_SEARCH_DEBOUNCE_MS` - Search input debounce (default: 500)
//! - `ADMIN_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct AdminConfig {
    /// REST API base URL, always ending in `/`
    pub api_base_url: Url,
    /// Bearer token for the REST API
    pub api_token: Option<SecretString>,
    /// Rows per list page
    pub page_size: u32,
    /// Quiet period before a search term is applied
    pub search_debounce: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("page_size", &self.page_size)
            .field("search_debounce", &self.search_debounce)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AdminConfig {
    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url: with_trailing_slash(api_base_url),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(500),
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get_required_env(&lookup, "ADMIN_API_BASE_URL")?;
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ADMIN_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_API_BASE_URL".to_string(),
                format!("unsupported scheme {}", api_base_url.scheme()),
            ));
        }

        let api_token = get_optional_env(&lookup, "ADMIN_API_TOKEN")
            .map(|token| {
                validate_token(&token, "ADMIN_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let page_size = parse_or_default(&lookup, "ADMIN_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        let debounce_ms = parse_or_default(&lookup, "ADMIN_SEARCH_DEBOUNCE_MS", 500u64)?;
        let timeout_secs = parse_or_default(&lookup, "ADMIN_REQUEST_TIMEOUT_SECS", 15u64)?;

        Ok(Self {
            api_base_url: with_trailing_slash(api_base_url),
            api_token,
            page_size,
            search_debounce: Duration::from_millis(debounce_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The bearer token, if configured.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.api_token.as_ref().map(ExposeSecret::expose_secret)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Relative joins drop the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Get a required environment variable.
fn get_required_env(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(lookup, key).map_or(Ok(default), |v| {
        v.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Reject tokens that are obviously copied from a sample `.env`.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_base_url_required() {
        let err = AdminConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ADMIN_API_BASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            AdminConfig::from_lookup(lookup(&[("ADMIN_API_BASE_URL", "http://localhost:8080")]))
                .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert!(config.bearer_token().is_none());
    }

    #[test]
    fn test_base_path_is_kept_for_joins() {
        let config = AdminConfig::from_lookup(lookup(&[(
            "ADMIN_API_BASE_URL",
            "https://shop.example.vn/backoffice",
        )]))
        .unwrap();
        let joined = config.api_base_url.join("api/admin/orders").unwrap();
        assert_eq!(
            joined.as_str(),
            "https://shop.example.vn/backoffice/api/admin/orders"
        );
    }

    #[test]
    fn test_invalid_values() {
        let base = ("ADMIN_API_BASE_URL", "http://localhost:8080");
        assert!(AdminConfig::from_lookup(lookup(&[("ADMIN_API_BASE_URL", "not a url")])).is_err());
        assert!(AdminConfig::from_lookup(lookup(&[("ADMIN_API_BASE_URL", "ftp://host")])).is_err());
        assert!(AdminConfig::from_lookup(lookup(&[base, ("ADMIN_PAGE_SIZE", "0")])).is_err());
        assert!(AdminConfig::from_lookup(lookup(&[base, ("ADMIN_PAGE_SIZE", "ten")])).is_err());
        assert!(
            AdminConfig::from_lookup(lookup(&[base, ("ADMIN_API_TOKEN", "your-token-here")]))
                .is_err()
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AdminConfig::from_lookup(lookup(&[
            ("ADMIN_API_BASE_URL", "http://localhost:8080"),
            ("ADMIN_API_TOKEN", "tk_9f8a7b6c5d4e3f2a1b0c"),
        ]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tk_9f8a7b6c5d4e3f2a1b0c"));
        assert_eq!(config.bearer_token(), Some("tk_9f8a7b6c5d4e3f2a1b0c"));
    }
}
