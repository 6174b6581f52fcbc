//! Error types for the admin REST client.

use thiserror::Error;

/// Errors that can occur when talking to the admin REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Failed to parse the response body.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected before sending.
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl ApiError {
    /// Message fit for a user-facing notice, if the server supplied one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            Self::Invalid(message) => Some(message),
            _ => None,
        }
    }
}

/// Error body shapes the API uses: `{"error": ...}`, `{"message": ...}` or
/// plain text.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Extract the message from an error response body.
pub(crate) fn message_from_body(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 409,
            message: "Mã khuyến mãi đã tồn tại".to_string(),
        };
        assert_eq!(err.to_string(), "API error (409): Mã khuyến mãi đã tồn tại");
        assert_eq!(err.server_message(), Some("Mã khuyến mãi đã tồn tại"));
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(message_from_body(r#"{"error":"Không thể xóa"}"#), "Không thể xóa");
        assert_eq!(message_from_body(r#"{"message":"Not found"}"#), "Not found");
        assert_eq!(message_from_body("  Category has products \n"), "Category has products");
        assert_eq!(message_from_body(""), "");
    }
}
