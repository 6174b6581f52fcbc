//! Unified error handling for admin.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::notice::Notice;

/// Application-level error type for the admin glue.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Admin REST API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// A list or dashboard section failed to load.
    #[error("{0}")]
    Load(Notice),
}

impl From<Notice> for AdminError {
    fn from(notice: Notice) -> Self {
        Self::Load(notice)
    }
}

impl AdminError {
    /// Log the error and report it to Sentry when it is not the user's doing.
    pub fn report(&self) {
        if matches!(self, Self::Render(_) | Self::Api(ApiError::Parse(_))) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin error"
            );
        } else {
            tracing::warn!(error = %self, "Admin error");
        }
    }
}

/// Result type alias for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdminError::from(ConfigError::MissingEnvVar("ADMIN_API_BASE_URL".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: ADMIN_API_BASE_URL"
        );

        let err = AdminError::from(Notice::error("Lỗi khi tải danh mục"));
        assert_eq!(err.to_string(), "Lỗi khi tải danh mục");
    }
}
