//! Page count and navigation window.
//!
//! Pages are one-based here; [`PageState`] keeps the zero-based index the
//! table works with internally.

use tracing::warn;

/// Current page and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// Zero-based page index
    pub index: usize,
    /// Items per page, always > 0
    pub size: usize,
}

impl PageState {
    pub fn new(size: usize) -> Self {
        Self {
            index: 0,
            size: Self::sanitize_size(size),
        }
    }

    pub fn sanitize_size(size: usize) -> usize {
        if size == 0 {
            warn!(target: "pagination", "Page size 0 is invalid, using 1");
            1
        } else {
            size
        }
    }

    /// One-based page number for display
    pub fn display_page(&self) -> usize {
        self.index + 1
    }

    /// Offset of the first item on this page
    pub fn offset(&self) -> usize {
        self.index * self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EllipsisSide {
    Left,
    Right,
}

/// One navigation control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageButton {
    Previous { target: usize, disabled: bool },
    Page { number: usize, active: bool },
    Ellipsis(EllipsisSide),
    Next { target: usize, disabled: bool },
}

/// Everything needed to draw a pagination bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub total_items: usize,
    pub items_per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub buttons: Vec<PageButton>,
    /// Items shown on the current page as reported by the bar
    pub item_count: usize,
}

impl PaginationWindow {
    /// Page numbers present in the window, in order
    pub fn page_numbers(&self) -> Vec<usize> {
        self.buttons
            .iter()
            .filter_map(|b| match b {
                PageButton::Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    /// e.g. `Mostrando 25 de 250`
    pub fn item_count_label(&self, showing: &str) -> String {
        format!("{} {} de {}", showing, self.item_count, self.total_items)
    }

    /// Single-line rendering: `Previo 1 .. 4 [5] 6 .. 10 Siguiente`
    pub fn render_compact(&self, previous: &str, next: &str) -> String {
        self.buttons
            .iter()
            .map(|b| match b {
                PageButton::Previous { .. } => previous.to_string(),
                PageButton::Next { .. } => next.to_string(),
                PageButton::Ellipsis(_) => "..".to_string(),
                PageButton::Page { number, active: true } => format!("[{}]", number),
                PageButton::Page { number, .. } => number.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Number of pages for `total_items`, never less than 1
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    let per_page = items_per_page.max(1);
    total_items.div_ceil(per_page).max(1)
}

/// Compute the navigation window around `current_page` (one-based)
pub fn compute_window(
    total_items: usize,
    items_per_page: usize,
    current_page: usize,
) -> PaginationWindow {
    let items_per_page = items_per_page.max(1);
    let total_pages = total_pages(total_items, items_per_page);
    let mut buttons = Vec::new();

    buttons.push(PageButton::Previous {
        target: current_page.saturating_sub(1),
        disabled: current_page == 1,
    });

    buttons.push(PageButton::Page {
        number: 1,
        active: current_page == 1,
    });

    if current_page > 3 {
        buttons.push(PageButton::Ellipsis(EllipsisSide::Left));
    }

    let first_middle = current_page.saturating_sub(1).max(2);
    let last_middle = (total_pages - 1).min(current_page + 1);
    for number in first_middle..=last_middle {
        buttons.push(PageButton::Page {
            number,
            active: current_page == number,
        });
    }

    if current_page + 2 < total_pages {
        buttons.push(PageButton::Ellipsis(EllipsisSide::Right));
    }

    if total_pages > 1 {
        buttons.push(PageButton::Page {
            number: total_pages,
            active: current_page == total_pages,
        });
    }

    buttons.push(PageButton::Next {
        target: current_page + 1,
        disabled: current_page == total_pages,
    });

    let item_count = if current_page == total_pages {
        match total_items % items_per_page {
            0 => items_per_page,
            remainder => remainder,
        }
    } else {
        items_per_page
    };

    PaginationWindow {
        total_items,
        items_per_page,
        current_page,
        total_pages,
        buttons,
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_in_the_middle() {
        let window = compute_window(250, 25, 5);
        assert_eq!(window.total_pages, 10);
        assert_eq!(
            window.buttons,
            vec![
                PageButton::Previous { target: 4, disabled: false },
                PageButton::Page { number: 1, active: false },
                PageButton::Ellipsis(EllipsisSide::Left),
                PageButton::Page { number: 4, active: false },
                PageButton::Page { number: 5, active: true },
                PageButton::Page { number: 6, active: false },
                PageButton::Ellipsis(EllipsisSide::Right),
                PageButton::Page { number: 10, active: false },
                PageButton::Next { target: 6, disabled: false },
            ]
        );
    }

    #[test]
    fn test_single_page() {
        let window = compute_window(7, 25, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.page_numbers(), vec![1]);
        assert!(matches!(window.buttons[0], PageButton::Previous { disabled: true, .. }));
        assert!(matches!(
            window.buttons.last(),
            Some(PageButton::Next { disabled: true, .. })
        ));
        assert_eq!(window.item_count, 7);
    }

    #[test]
    fn test_zero_items_still_one_page() {
        let window = compute_window(0, 25, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.item_count, 25);
    }

    #[test]
    fn test_first_pages_have_no_left_ellipsis() {
        let window = compute_window(100, 10, 3);
        assert_eq!(window.page_numbers(), vec![1, 2, 3, 4, 10]);
        assert!(!window.buttons.contains(&PageButton::Ellipsis(EllipsisSide::Left)));
        assert!(window.buttons.contains(&PageButton::Ellipsis(EllipsisSide::Right)));
    }

    #[test]
    fn test_last_page_item_count() {
        assert_eq!(compute_window(53, 25, 3).item_count, 3);
        assert_eq!(compute_window(50, 25, 2).item_count, 25);
        assert_eq!(compute_window(53, 25, 1).item_count, 25);
    }

    #[test]
    fn test_labels() {
        let window = compute_window(250, 25, 5);
        assert_eq!(window.item_count_label("Mostrando"), "Mostrando 25 de 250");
        assert_eq!(
            window.render_compact("Previo", "Siguiente"),
            "Previo 1 .. 4 [5] 6 .. 10 Siguiente"
        );
    }

    #[test]
    fn test_page_state() {
        let mut state = PageState::new(0);
        assert_eq!(state.size, 1);
        state = PageState::new(25);
        state.index = 2;
        assert_eq!(state.display_page(), 3);
        assert_eq!(state.offset(), 50);
    }
}
