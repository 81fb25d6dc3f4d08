//! Pagination types

use serde::{Deserialize, Serialize};

/// `?page=&page_size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// A resolved, bounded page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Pages are 1-based; `page_size` falls back to `default_size` and is capped at `max_size`
    pub fn resolve(params: PageParams, default_size: u32, max_size: u32) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            page_size: params.page_size.unwrap_or(default_size).clamp(1, max_size.max(1)),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            page: request.page,
            page_size: request.page_size,
            results,
        }
    }
}
