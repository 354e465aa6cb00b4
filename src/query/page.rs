//! Offset/limit pagination with page metadata
//!
//! Page numbers are 1-indexed. The `has_prev_page` definition is the legacy
//! `(page - 1) != 0` boundary check: false only for page 1, true even for
//! page 0 or negative pages. Preserved deliberately for client compatibility
//! and pinned by a regression test rather than silently corrected.

use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// A requested page window, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: i64,
    pub page: i64,
}

impl PageRequest {
    pub fn new(page_size: i64, page: i64) -> Self {
        Self { page_size, page }
    }

    /// Records skipped before this page's window
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Reject non-positive page sizes
    pub fn validate(&self) -> EngineResult<()> {
        if self.page_size <= 0 {
            return Err(EngineError::InvalidPageSize(self.page_size));
        }
        Ok(())
    }
}

impl Default for PageRequest {
    /// First page of ten, matching the legacy resolver defaults
    fn default() -> Self {
        Self {
            page_size: 10,
            page: 1,
        }
    }
}

/// Information about pagination in a result set
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub page_size: i64,
    pub current_page: i64,
}

impl PageInfo {
    /// Compute page metadata from the pre-window total.
    ///
    /// The request must already be validated.
    pub fn compute(total_count: i64, request: PageRequest) -> Self {
        let total_pages = (total_count + request.page_size - 1) / request.page_size;

        Self {
            total_count,
            total_pages,
            has_next_page: (request.page + 1) <= total_pages,
            has_prev_page: (request.page - 1) != 0,
            page_size: request.page_size,
            current_page: request.page,
        }
    }
}

/// One page of results with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}
