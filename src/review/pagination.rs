//! Pagination window over the sorted view
//!
//! The page size is fixed when the window is created. The page index is
//! clamped so it never points past the last page of the current view.

use crate::config::settings::DEFAULT_PAGE_SIZE;

/// Current page position over a sequence of known length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    page_index: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Create a window on page 0. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Number of pages for `total` items; an empty view still has one (empty) page
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn can_go_next(&self, total: usize) -> bool {
        (self.page_index + 1) * self.page_size < total
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Back to the first page
    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// Pull the index back onto the last valid page after the view shrank
    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
    }

    /// Advance one page; returns false when already on the last page
    pub fn next(&mut self, total: usize) -> bool {
        if !self.can_go_next(total) {
            return false;
        }
        self.page_index += 1;
        true
    }

    /// Go back one page; returns false when already on the first page
    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    /// Jump to a page; out-of-range requests land on the last page
    pub fn go_to(&mut self, page_index: usize, total: usize) {
        self.page_index = page_index;
        self.clamp(total);
    }

    /// Index range of the current page within a sequence of `total` items
    pub fn bounds(&self, total: usize) -> std::ops::Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Slice out the current page
    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_five_items_two_pages() {
        let items: Vec<u32> = (0..25).collect();
        let mut pagination = Pagination::new(20);

        assert_eq!(pagination.page(&items).len(), 20);
        assert!(pagination.can_go_next(items.len()));
        assert!(!pagination.can_go_previous());

        assert!(pagination.next(items.len()));
        assert_eq!(pagination.page(&items), &items[20..25]);
        assert!(!pagination.can_go_next(items.len()));
        assert!(pagination.can_go_previous());

        assert!(!pagination.next(items.len()));
        assert_eq!(pagination.page_index(), 1);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let mut pagination = Pagination::new(10);
        assert_eq!(pagination.page_count(20), 2);
        pagination.next(20);
        assert!(!pagination.can_go_next(20));
    }

    #[test]
    fn test_empty_view() {
        let items: Vec<u32> = Vec::new();
        let pagination = Pagination::new(20);
        assert!(pagination.page(&items).is_empty());
        assert_eq!(pagination.page_count(0), 1);
        assert!(!pagination.can_go_next(0));
        assert!(!pagination.can_go_previous());
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pagination = Pagination::new(10);
        pagination.go_to(4, 50);
        assert_eq!(pagination.page_index(), 4);

        pagination.clamp(15);
        assert_eq!(pagination.page_index(), 1);

        pagination.clamp(0);
        assert_eq!(pagination.page_index(), 0);
    }

    #[test]
    fn test_go_to_out_of_range_lands_on_last_page() {
        let items: Vec<u32> = (0..35).collect();
        let mut pagination = Pagination::new(10);
        pagination.go_to(99, items.len());
        assert_eq!(pagination.page_index(), 3);
        assert_eq!(pagination.page(&items), &items[30..35]);
    }

    #[test]
    fn test_previous_and_reset() {
        let mut pagination = Pagination::new(5);
        pagination.go_to(2, 30);
        assert!(pagination.previous());
        assert_eq!(pagination.page_index(), 1);
        pagination.reset();
        assert_eq!(pagination.page_index(), 0);
        assert!(!pagination.previous());
    }

    #[test]
    fn test_zero_page_size_becomes_one() {
        assert_eq!(Pagination::new(0).page_size(), 1);
    }
}
