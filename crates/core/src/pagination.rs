//! Page arithmetic for list endpoints.

use serde::Serialize;

/// A validated page request.
///
/// Pages are 1-based. Anything unparsable or below one is treated as the
/// first page, and a zero or missing limit falls back to the endpoint default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Upper bound on page size.
    pub const MAX_LIMIT: u32 = 100;

    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .clamp(1, Self::MAX_LIMIT);
        Self { page, limit }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip, as an SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Number of pages needed for `total` rows (`ceil(total / limit)`).
    #[must_use]
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (total + limit - 1) / limit
    }
}

/// Pagination block returned alongside blog listings.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_blogs: i64,
    pub page_size: u32,
}

impl PageInfo {
    #[must_use]
    pub fn new(pagination: Pagination, total: i64) -> Self {
        Self {
            current_page: pagination.page(),
            total_pages: pagination.total_pages(total),
            total_blogs: total,
            page_size: pagination.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None, 12);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 12);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_zero_page_is_first_page() {
        let p = Pagination::new(Some(0), Some(0), 20);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_offset() {
        let p = Pagination::new(Some(3), Some(12), 12);
        assert_eq!(p.offset(), 24);
    }

    #[test]
    fn test_limit_is_capped() {
        let p = Pagination::new(Some(1), Some(5000), 12);
        assert_eq!(p.limit(), Pagination::MAX_LIMIT);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(12), 12);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(12), 1);
        assert_eq!(p.total_pages(13), 2);
        assert_eq!(p.total_pages(25), 3);
    }

    #[test]
    fn test_page_info() {
        let info = PageInfo::new(Pagination::new(Some(2), Some(10), 12), 31);
        assert_eq!(info.current_page, 2);
        assert_eq!(info.total_pages, 4);
        assert_eq!(info.total_blogs, 31);
        assert_eq!(info.page_size, 10);
    }
}
