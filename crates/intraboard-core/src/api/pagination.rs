//! Pagination metadata and result assembly

use crate::error::FetchError;
use reqwest::header::HeaderMap;
use serde::Serialize;

/// Total item count header
pub const TOTAL_HEADER: &str = "x-total";

/// Page size header
pub const PER_PAGE_HEADER: &str = "x-per-page";

/// Page size query parameter, merged into every request
pub const PAGE_SIZE_PARAM: &str = "page[size]";

/// Page number query parameter (1-based)
pub const PAGE_NUMBER_PARAM: &str = "page[number]";

/// Declared size of a paginated collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total: usize,
    pub per_page: usize,
}

impl PageMeta {
    /// Read `X-Total` and `X-Per-Page` from a response
    pub fn from_headers(endpoint: &str, headers: &HeaderMap) -> Result<Self, FetchError> {
        let total = read_count(endpoint, headers, TOTAL_HEADER)?;
        let per_page = read_count(endpoint, headers, PER_PAGE_HEADER)?;

        if per_page == 0 {
            return Err(FetchError::InvalidHeader {
                endpoint: endpoint.to_string(),
                header: PER_PAGE_HEADER,
                value: "0".to_string(),
            });
        }

        Ok(Self { total, per_page })
    }

    /// `ceil(total / per_page)`
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }
}

fn read_count(
    endpoint: &str,
    headers: &HeaderMap,
    header: &'static str,
) -> Result<usize, FetchError> {
    let value = headers
        .get(header)
        .ok_or_else(|| FetchError::MissingHeader {
            endpoint: endpoint.to_string(),
            header,
        })?;

    let invalid = || FetchError::InvalidHeader {
        endpoint: endpoint.to_string(),
        header,
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
    };

    value
        .to_str()
        .map_err(|_| invalid())?
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid())
}

/// One fetched page, consumed right away by the paginator
#[derive(Debug)]
pub(crate) struct PageResponse<T> {
    pub items: Vec<T>,
    pub headers: HeaderMap,
}

/// Every item of one logical query, in server order
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet<T> {
    pub items: Vec<T>,
    /// Item count declared by the server
    pub total: usize,
    /// HTTP requests issued to build this set
    pub requests: usize,
}

impl<T> ResultSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(total: &'static str, per_page: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_HEADER, HeaderValue::from_static(total));
        headers.insert(PER_PAGE_HEADER, HeaderValue::from_static(per_page));
        headers
    }

    #[test]
    fn test_page_count_rounds_up() {
        let meta = PageMeta::from_headers("/v2/x", &headers("250", "100")).unwrap();
        assert_eq!(meta.page_count(), 3);

        let meta = PageMeta::from_headers("/v2/x", &headers("200", "100")).unwrap();
        assert_eq!(meta.page_count(), 2);

        let meta = PageMeta::from_headers("/v2/x", &headers("0", "100")).unwrap();
        assert_eq!(meta.page_count(), 0);
    }

    #[test]
    fn test_missing_total_header() {
        let mut map = HeaderMap::new();
        map.insert(PER_PAGE_HEADER, HeaderValue::from_static("100"));

        let err = PageMeta::from_headers("/v2/x", &map).unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingHeader {
                header: TOTAL_HEADER,
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_header() {
        let err = PageMeta::from_headers("/v2/x", &headers("lots", "100")).unwrap_err();
        match err {
            FetchError::InvalidHeader { value, .. } => assert_eq!(value, "lots"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = PageMeta::from_headers("/v2/x", &headers("10", "0")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidHeader { .. }));
    }
}
