//! Transient user-facing notices.
//!
//! Failures of admin actions are never retried; they surface as a notice the
//! page shows for a few seconds.

use std::time::Duration;

use askama::Template;
use tracing::warn;

use crate::api::ApiError;

/// How long a notice stays on screen.
pub const DISPLAY_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notification-success",
            Self::Error => "notification-error",
            Self::Info => "notification-info",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "bi-check-circle",
            Self::Error => "bi-x-circle",
            Self::Info => "bi-info-circle",
        }
    }
}

/// A message for the admin user. Displays as its message; render markup
/// through [`NoticeView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Error notice for a failed action: the server's message when it gave
    /// one, `fallback` otherwise.
    #[must_use]
    pub fn from_api_error(fallback: &str, err: &ApiError) -> Self {
        warn!(error = %err, "{fallback}");
        Self::error(err.server_message().unwrap_or(fallback))
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }

    #[must_use]
    pub const fn view(&self) -> NoticeView<'_> {
        NoticeView { notice: self }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Toast markup for one notice.
#[derive(Debug, Template)]
#[template(path = "components/notice.html")]
pub struct NoticeView<'a> {
    pub notice: &'a Notice,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_error_prefers_server_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Mã đã tồn tại".to_string(),
        };
        let notice = Notice::from_api_error("Có lỗi xảy ra", &err);
        assert!(notice.is_error());
        assert_eq!(notice.message, "Mã đã tồn tại");

        let err = ApiError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(Notice::from_api_error("Có lỗi xảy ra", &err).message, "Có lỗi xảy ra");
    }

    #[test]
    fn test_render_escapes_message() {
        let notice = Notice::success("<b>ok</b>");
        let markup = notice.view().render().unwrap();
        assert!(markup.contains("notification-success"));
        assert!(markup.contains("bi-check-circle"));
        assert!(!markup.contains("<b>ok"));
        assert!(markup.contains("&#60;b&#62;ok&#60;/b&#62;"));
    }

    #[test]
    fn test_display_is_message_only() {
        let notice = Notice::error("Lỗi khi tải danh mục");
        assert_eq!(notice.to_string(), "Lỗi khi tải danh mục");
        assert!(notice.view().to_string().contains("notification-error"));
    }
}
