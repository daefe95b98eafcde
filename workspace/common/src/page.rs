use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A bounded slice of a larger, already filtered result set.
///
/// `page_index` is zero based and `total_count` is the size of the whole
/// filtered set, not just of `items`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: u64,
    pub page_size: u64,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_index: u64, page_size: u64, total_count: u64) -> Self {
        Self {
            items,
            page_index,
            page_size,
            total_count,
        }
    }

    pub fn empty(page_index: u64, page_size: u64) -> Self {
        Self::new(Vec::new(), page_index, page_size, 0)
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages()
    }

    /// Index of the previous page, saturating at the first page.
    pub fn previous_index(&self) -> u64 {
        self.page_index.saturating_sub(1)
    }

    pub fn next_index(&self) -> u64 {
        self.page_index + 1
    }

    /// Converts the items while keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}
