use serde::Serialize;

/// Validated page window for the aggregation pipelines.
///
/// Offset pagination: every request re-scans and re-sorts buckets from the
/// start, so cost grows linearly with page depth. Accepted for the bounded
/// page depths this dashboard produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Parse raw `page`/`limit` query values, silently clamping anything
    /// absent, non-numeric, or non-positive: page falls back to 1, limit to
    /// `default_limit`. Bad input is never an error.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
            .map_or(1, |p| p.unsigned_abs());
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map_or(default_limit, |l| l.unsigned_abs());
        Self { page, limit }
    }

    /// Number of buckets skipped before this page's window. Saturates
    /// instead of overflowing for absurd page/limit pairs; the query then
    /// returns an empty window.
    pub const fn offset(self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// LIMIT bind value for DuckDB (which takes signed integers).
    pub fn limit_i64(self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    /// OFFSET bind value for DuckDB.
    pub fn offset_i64(self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }
}

/// Total pages for a bucket count: ceil(total / limit).
pub const fn page_count(total_buckets: u64, limit: u64) -> u64 {
    total_buckets.div_ceil(limit)
}

/// One page of buckets plus the dataset-wide bucket count from the
/// independent counting branch.
#[derive(Debug)]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub total_buckets: u64,
}

/// Wire envelope: `{data: [...], noOfPages: n}`.
#[derive(Debug, Serialize)]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    #[serde(rename = "noOfPages")]
    pub no_of_pages: u64,
}

impl<T> Paginated<T> {
    /// Convert to the response envelope. An empty page (including the
    /// zero-buckets-overall case, where the count branch yields nothing)
    /// becomes `None`, which serializes as a JSON `null` body rather than
    /// `{data: [], noOfPages: 0}`.
    pub fn into_envelope(self, limit: u64) -> Option<PageEnvelope<T>> {
        if self.rows.is_empty() {
            return None;
        }
        Some(PageEnvelope {
            data: self.rows,
            no_of_pages: page_count(self.total_buckets, limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::from_raw(None, None, 10);
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_page_request_valid() {
        let req = PageRequest::from_raw(Some("3"), Some("5"), 10);
        assert_eq!(req, PageRequest { page: 3, limit: 5 });
        assert_eq!(req.offset(), 10);
    }

    #[test]
    fn test_page_request_clamps_invalid() {
        for bad in ["0", "-2", "abc", "2.5", ""] {
            let req = PageRequest::from_raw(Some(bad), Some(bad), 10);
            assert_eq!(req, PageRequest { page: 1, limit: 10 }, "input {bad:?}");
        }
    }

    #[test]
    fn test_offset_saturates_on_huge_window() {
        let req = PageRequest::from_raw(
            Some("9000000000000000000"),
            Some("9000000000000000000"),
            10,
        );
        // no overflow; the saturated offset lands past any real dataset
        assert_eq!(req.offset(), u64::MAX);
        assert_eq!(req.offset_i64(), i64::MAX);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(4, 4), 1);
    }

    #[test]
    fn test_empty_page_is_null() {
        let page: Paginated<u32> = Paginated {
            rows: Vec::new(),
            total_buckets: 0,
        };
        assert!(page.into_envelope(10).is_none());
    }

    #[test]
    fn test_envelope_page_count() {
        let page = Paginated {
            rows: vec![1, 2, 3],
            total_buckets: 23,
        };
        let envelope = page.into_envelope(5).unwrap();
        assert_eq!(envelope.data, vec![1, 2, 3]);
        assert_eq!(envelope.no_of_pages, 5);
    }

    #[test]
    fn test_envelope_serialization() {
        let page = Paginated {
            rows: vec!["a", "b"],
            total_buckets: 2,
        };
        let json = serde_json::to_string(&page.into_envelope(10)).unwrap();
        assert_eq!(json, r#"{"data":["a","b"],"noOfPages":1}"#);

        let empty: Option<PageEnvelope<&str>> = None;
        assert_eq!(serde_json::to_string(&empty).unwrap(), "null");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// noOfPages == ceil(total / limit) for every non-empty result.
        #[test]
        fn prop_page_count_is_ceil(total in 1u64..100_000, limit in 1u64..1_000) {
            let pages = page_count(total, limit);
            prop_assert!(pages * limit >= total);
            prop_assert!((pages - 1) * limit < total);
        }

        /// Parsed page/limit are always positive, whatever the raw input.
        #[test]
        fn prop_page_request_always_positive(
            page in proptest::option::of("[ -~]{0,8}"),
            limit in proptest::option::of("[ -~]{0,8}"),
        ) {
            let req = PageRequest::from_raw(page.as_deref(), limit.as_deref(), 10);
            prop_assert!(req.page >= 1);
            prop_assert!(req.limit >= 1);
        }
    }
}
