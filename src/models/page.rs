//! Offset pagination shared by the feed endpoints.

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Pages and limits below 1 are read as 1. Large limits are honoured so
    /// that `total_pages` always matches the limit the client sent.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
        }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_lower_bounds() {
        assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(-3), Some(500)), PageRequest { page: 1, limit: 500 });
    }

    #[test]
    fn large_limit_fits_on_one_page() {
        let page = PageRequest::new(None, Some(200));
        assert_eq!(page.total_pages(150), 1);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn skip_is_zero_based_offset() {
        assert_eq!(PageRequest::new(Some(1), Some(10)).skip(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(10)).skip(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageRequest::new(Some(1), Some(10));
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
        assert_eq!(page.total_pages(25), 3);
    }
}
