//! Pagination bar shared by every admin list.
//!
//! Window rules, with `current` one-based:
//! - the first and last pages are always shown
//! - pages within two of `current` are shown
//! - a page exactly three away from `current` becomes an ellipsis
//! - previous/next are disabled on the first/last page

use askama::Template;

/// Pages shown on each side of the current page.
const WINDOW: i64 = 2;

/// One entry of the page-number row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    /// One-based page number; meaningless for an ellipsis.
    pub number: u32,
    pub active: bool,
    pub ellipsis: bool,
}

impl PageButton {
    const fn page(number: u32, active: bool) -> Self {
        Self {
            number,
            active,
            ellipsis: false,
        }
    }

    const fn ellipsis() -> Self {
        Self {
            number: 0,
            active: false,
            ellipsis: true,
        }
    }
}

/// Pagination bar plus the "showing start-end of total" counters.
#[derive(Debug, Clone, PartialEq, Eq, Template)]
#[template(path = "components/pagination.html")]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub buttons: Vec<PageButton>,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub showing_start: u64,
    pub showing_end: u64,
    pub total_elements: u64,
}

impl PaginationView {
    /// Build the bar for one-based page `current`.
    #[must_use]
    pub fn new(current: u32, total_pages: u32, total_elements: u64, page_size: u32) -> Self {
        let current = current.max(1);
        let buttons = window(current, total_pages);

        let size = u64::from(page_size);
        let (showing_start, showing_end) = if total_elements == 0 {
            (0, 0)
        } else {
            let start = u64::from(current - 1) * size + 1;
            (start.min(total_elements), (u64::from(current) * size).min(total_elements))
        };

        Self {
            current,
            total_pages,
            buttons,
            prev_disabled: current <= 1,
            next_disabled: current >= total_pages,
            showing_start,
            showing_end,
            total_elements,
        }
    }

    #[must_use]
    pub const fn prev_page(&self) -> u32 {
        self.current.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.current.saturating_add(1)
    }

    /// Page numbers as rendered, with `...` for each ellipsis.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.buttons
            .iter()
            .map(|b| {
                if b.ellipsis {
                    "...".to_string()
                } else {
                    b.number.to_string()
                }
            })
            .collect()
    }
}

fn window(current: u32, total_pages: u32) -> Vec<PageButton> {
    let current_i = i64::from(current);
    let mut buttons = Vec::new();
    for page in 1..=total_pages {
        let distance = (i64::from(page) - current_i).abs();
        if page == 1 || page == total_pages || distance <= WINDOW {
            buttons.push(PageButton::page(page, page == current));
        } else if distance == WINDOW + 1 {
            buttons.push(PageButton::ellipsis());
        }
    }
    buttons
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_window_in_the_middle() {
        let view = PaginationView::new(6, 12, 120, 10);
        assert_eq!(
            view.labels(),
            ["1", "...", "4", "5", "6", "7", "8", "...", "12"]
        );
        assert!(view.buttons.iter().any(|b| b.active && b.number == 6));
        assert!(!view.prev_disabled);
        assert!(!view.next_disabled);
    }

    #[test]
    fn test_window_at_edges() {
        let first = PaginationView::new(1, 12, 120, 10);
        assert_eq!(first.labels(), ["1", "2", "3", "...", "12"]);
        assert!(first.prev_disabled);

        let last = PaginationView::new(12, 12, 120, 10);
        assert_eq!(last.labels(), ["1", "...", "10", "11", "12"]);
        assert!(last.next_disabled);
    }

    #[test]
    fn test_no_ellipsis_when_gap_is_wider() {
        // Pages 2 and 3 are more than three away from 7 and are skipped.
        let view = PaginationView::new(7, 12, 120, 10);
        assert_eq!(
            view.labels(),
            ["1", "...", "5", "6", "7", "8", "9", "...", "12"]
        );
    }

    #[test]
    fn test_showing_counters() {
        let view = PaginationView::new(3, 3, 25, 10);
        assert_eq!((view.showing_start, view.showing_end), (21, 25));

        let empty = PaginationView::new(1, 0, 0, 10);
        assert_eq!((empty.showing_start, empty.showing_end), (0, 0));
        assert!(empty.buttons.is_empty());
        assert!(empty.prev_disabled && empty.next_disabled);
    }

    #[test]
    fn test_render() {
        let markup = PaginationView::new(2, 3, 25, 10).render().unwrap();
        assert!(markup.contains(r#"data-page="1""#));
        assert!(markup.contains("page-btn active"));
        assert!(markup.contains("11"));
        assert!(markup.contains("20"));
    }
}
