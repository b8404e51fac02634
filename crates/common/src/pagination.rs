//! Pagination utilities shared by the store and HTTP layers.
//!
//! Provides a `Pagination` request and a `Page<T>` response envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters as supplied by a caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// 0-based page index
    pub page: Option<u64>,
    /// items per page
    pub size: Option<u64>,
}

impl Pagination {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page: Some(page), size: Some(size) }
    }

    /// Clamp to sane defaults, returning `(page_index, page_size)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (page, size)
    }

    /// Number of rows to skip for the normalized page.
    pub fn offset(self) -> u64 {
        let (page, size) = self.normalize();
        page.saturating_mul(size)
    }
}

/// One page of results plus the totals needed to walk the rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: Pagination, total_elements: u64) -> Self {
        let (page, size) = request.normalize();
        Self { content, page, size, total_elements }
    }

    /// Slice an already filtered and sorted row set down to the requested page.
    pub fn from_rows(rows: Vec<T>, request: Pagination) -> Self {
        let total = rows.len() as u64;
        let (_, size) = request.normalize();
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(size).unwrap_or(usize::MAX);
        let content = rows.into_iter().skip(skip).take(take).collect();
        Self::new(content, request, total)
    }

    /// Keep the paging metadata, replace the rows.
    pub fn with_content<U>(&self, content: Vec<U>) -> Page<U> {
        Page { content, page: self.page, size: self.size, total_elements: self.total_elements }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(self.size.max(1))
    }
}
