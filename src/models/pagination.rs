//! Offset pagination primitives for walking remote list endpoints.

use serde::{Deserialize, Serialize};

/// One page of a remote listing plus the total-count hint it reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }
}

/// Offset/limit cursor over a remote listing.
///
/// The total is supplied by each page as it arrives; the cursor keeps only
/// the latest one and decides from it whether another page is needed.
#[derive(Debug, Clone)]
pub struct PageCursor {
    offset: u64,
    limit: u64,
    total: Option<u64>,
}

impl PageCursor {
    /// Page size used for content type enumeration.
    pub const DEFAULT_LIMIT: u64 = 100;

    pub fn new(limit: u64) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
            total: None,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Whether another page must be requested.
    ///
    /// Always true before the first page, since the total is unknown.
    pub fn has_more(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => self.offset < total,
        }
    }

    /// Record a received page: advance the offset and adopt its total.
    pub fn advance(&mut self, total_count: u64) {
        self.total = Some(total_count);
        self.offset += self.limit;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_defaults() {
        let c = PageCursor::default();
        assert_eq!(c.limit(), 100);
        assert_eq!(c.offset(), 0);
        assert!(c.has_more());
    }

    #[test]
    fn cursor_clamps_zero_limit() {
        assert_eq!(PageCursor::new(0).limit(), 1);
    }

    #[test]
    fn cursor_stops_after_empty_total() {
        let mut c = PageCursor::default();
        c.advance(0);
        assert!(!c.has_more());
    }

    #[test]
    fn cursor_walks_two_pages_for_150() {
        let mut c = PageCursor::default();
        c.advance(150);
        assert!(c.has_more());
        assert_eq!(c.offset(), 100);
        c.advance(150);
        assert!(!c.has_more());
    }

    #[test]
    fn cursor_exact_multiple_needs_no_extra_page() {
        let mut c = PageCursor::default();
        c.advance(100);
        assert!(!c.has_more());
    }

    #[test]
    fn cursor_follows_growing_total() {
        let mut c = PageCursor::default();
        c.advance(90);
        assert!(!c.has_more());
        c.advance(250);
        assert!(c.has_more());
        assert_eq!(c.offset(), 200);
    }
}
