//! Pagination window derived from the filtered-set length.
//!
//! `PageWindow` never stores records; it only knows the page size, the
//! current page, and the page count derived from whatever length the table
//! controller last reported. Navigation outside `[1, total_pages]` is a
//! no-op, and page-size changes snap back to page 1.

use serde::{Deserialize, Serialize};

/// Page-size options offered by the views.
pub const PAGE_SIZES: &[usize] = &[5, 10, 20, 50];

/// One token in the rendered page-link row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageWindow {
    page_size: usize,
    current_page: usize,
    total_pages: usize,
}

impl PageWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Re-derive the page count from a new filtered-set length.
    ///
    /// An empty set still has one page. The current page is clamped so a
    /// shrinking set can never leave the cursor past the end.
    pub fn recompute(&mut self, filtered_len: usize) {
        self.total_pages = if filtered_len == 0 {
            1
        } else {
            filtered_len.div_ceil(self.page_size)
        };
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }

    /// Jump back to page 1 (filter/sort/source change).
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Navigate to a page. Out-of-range requests (0, or past the last page)
    /// leave the current page unchanged.
    pub fn set_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages {
            self.current_page = page;
        }
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Change the page size and snap back to page 1. The caller re-derives
    /// the page count via `recompute`.
    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.current_page = 1;
    }

    /// Cycle through the standard page-size options.
    pub fn cycle_page_size(&mut self) {
        let idx = PAGE_SIZES
            .iter()
            .position(|s| *s == self.page_size)
            .map(|i| (i + 1) % PAGE_SIZES.len())
            .unwrap_or(0);
        self.set_page_size(PAGE_SIZES[idx]);
    }

    /// Index range of the current page within a set of `filtered_len` items.
    pub fn page_bounds(&self, filtered_len: usize) -> std::ops::Range<usize> {
        let start = (self.current_page - 1) * self.page_size;
        let start = start.min(filtered_len);
        let end = (start + self.page_size).min(filtered_len);
        start..end
    }

    /// "Showing X to Y of Z entries" numbers (1-based, zero when empty).
    pub fn showing(&self, filtered_len: usize) -> (usize, usize, usize) {
        if filtered_len == 0 {
            return (0, 0, 0);
        }
        let bounds = self.page_bounds(filtered_len);
        (bounds.start + 1, bounds.end, filtered_len)
    }

    /// Page-link row: first page, a window of up to three interior pages
    /// around the current one, the last page, and ellipsis tokens where the
    /// window leaves gaps.
    pub fn page_links(&self) -> Vec<PageLink> {
        const MAX_VISIBLE: usize = 5;
        let total = self.total_pages;
        let current = self.current_page;

        let mut links = vec![PageLink::Page(1)];

        let mut start = 2.max(current.saturating_sub(MAX_VISIBLE / 2));
        let end = total.saturating_sub(1).min(start + MAX_VISIBLE - 3);
        if end.saturating_sub(start) < MAX_VISIBLE - 3 {
            start = 2.max(end.saturating_sub(MAX_VISIBLE - 3) + 1);
        }

        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
        for page in start..=end {
            links.push(PageLink::Page(page));
        }
        if end + 1 < total {
            links.push(PageLink::Ellipsis);
        }
        if total > 1 {
            links.push(PageLink::Page(total));
        }

        links
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(10)
    }
}
