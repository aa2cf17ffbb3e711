//! Client-side pagination over an already-fetched result set.

/// 1-based page cursor. The record list itself lives elsewhere; the
/// pager only knows how to slice it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size > 0);
        Self { page: 1, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages for `total` records, never less than 1 so an empty
    /// result set still reads "Page 1 of 1".
    pub fn page_count(&self, total: usize) -> usize {
        ((total + self.page_size - 1) / self.page_size).max(1)
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page < self.page_count(total)
    }

    pub fn prev(&mut self) {
        if self.has_prev() {
            self.page -= 1;
        }
    }

    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.page += 1;
        }
    }

    /// Records visible on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        if start >= items.len() {
            &[]
        } else {
            &items[start..end]
        }
    }

    /// Index into the full record list for a row on the current page.
    pub fn absolute(&self, row: usize) -> usize {
        (self.page - 1) * self.page_size + row
    }

    pub fn label(&self, total: usize) -> String {
        format!("Page {} of {}", self.page, self.page_count(total))
    }
}
