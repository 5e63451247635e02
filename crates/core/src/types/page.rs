//! Pagination envelope for list endpoints.

use serde::Serialize;

/// Which page of results is being requested.
///
/// Pages are 1-based; anything below 1 is clamped. Each surface picks its
/// own fixed page size (12 on the storefront catalog, 20 in the back
/// office) rather than accepting one from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: Option<u32>, per_page: u32) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let per_page = if per_page >= 1 { per_page } else { 1 };
        Self { page, per_page }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// SQL `LIMIT` argument.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page as i64
    }

    /// SQL `OFFSET` argument.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

/// One page of results plus the counts a client needs to render pager
/// controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and a `COUNT(*)` result.
    ///
    /// An empty result set still reports one page, so clients always have a
    /// current page to render.
    #[must_use]
    pub fn from_query(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let total_items = u64::try_from(total).unwrap_or(0);
        let per_page = u64::from(request.per_page());
        let total_pages = u32::try_from(total_items.div_ceil(per_page).max(1)).unwrap_or(u32::MAX);

        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
            total_pages,
        }
    }

    /// Convert the items while keeping the page counts.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
