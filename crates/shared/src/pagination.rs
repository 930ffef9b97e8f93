//! Page-based pagination parameter handling.

/// Default page when the parameter is absent or invalid.
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size when the parameter is absent or invalid.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub page_size: i64,
}

impl PageParams {
    /// Clamps raw query values into a valid page/page_size pair.
    ///
    /// Missing or non-positive values fall back to the defaults; page_size
    /// is capped at [`MAX_PAGE_SIZE`].
    pub fn clamped(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 => s.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    /// Row offset for a LIMIT/OFFSET query.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
