//! Paged list envelopes used by the admin REST API.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of results as returned by the list endpoints.
///
/// `content` entries that are JSON `null` are dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based index of this page, when the server reports it.
    #[serde(default, alias = "currentPage", skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl<T> Page<T> {
    /// An empty page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: None,
            size: None,
        }
    }

    /// Map the page contents, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            number: self.number,
            size: self.size,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

/// A page request: zero-based index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Build a request from a one-based page number as shown in the UI.
    #[must_use]
    pub const fn from_display_page(display_page: u32, size: u32) -> Self {
        Self {
            page: display_page.saturating_sub(1),
            size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_drops_null_entries() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"content":[1,null,3],"totalPages":1,"totalElements":2}"#)
                .unwrap();
        assert_eq!(page.content, vec![1, 3]);
        assert_eq!(page.total_elements, 2);
    }

    #[test]
    fn test_page_tolerates_missing_content() {
        let page: Page<u32> = serde_json::from_str(r#"{"content":null}"#).unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_page_accepts_current_page_alias() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"content":[],"totalPages":3,"currentPage":2}"#).unwrap();
        assert_eq!(page.number, Some(2));
    }

    #[test]
    fn test_page_request_from_display_page() {
        assert_eq!(PageRequest::from_display_page(1, 10).page, 0);
        assert_eq!(PageRequest::from_display_page(0, 10).page, 0);
        assert_eq!(PageRequest::from_display_page(4, 25).page, 3);
    }
}
