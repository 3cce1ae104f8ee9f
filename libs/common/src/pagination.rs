//! Page-based listing
//!
//! Pages are 1-indexed. Query parameters are taken as raw strings so that a
//! non-numeric or non-positive value falls back to the default instead of
//! rejecting the request. Sizes above `MAX_PAGE_SIZE` are clamped to it.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw `page` / `size` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    pub fn resolve(&self) -> PageRequest {
        PageRequest {
            page: parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            size: parse_positive(self.size.as_deref())
                .map_or(DEFAULT_PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE)),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Rows to skip, as bound to `OFFSET`
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.size))
    }

    /// Rows to take, as bound to `LIMIT`
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Number of pages needed for `total_items` rows of `size`
pub fn total_pages(total_items: i64, size: u32) -> i64 {
    if total_items <= 0 {
        return 0;
    }
    let size = i64::from(size.max(1));
    (total_items + size - 1) / size
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub size: u32,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total_items: i64, request: PageRequest) -> Self {
        Self {
            total_items,
            total_pages: total_pages(total_items, request.size),
            current_page: request.page,
            size: request.size,
            data,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            size: self.size,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, size: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn missing_parameters_use_defaults() {
        assert_eq!(query(None, None).resolve(), PageRequest { page: 1, size: 5 });
    }

    #[test]
    fn invalid_parameters_fall_back_to_defaults() {
        for raw in ["0", "-3", "abc", "", "1.5", "99999999999"] {
            let request = query(Some(raw), Some(raw)).resolve();
            assert_eq!(request, PageRequest { page: 1, size: 5 }, "input {raw:?}");
        }
    }

    #[test]
    fn valid_parameters_are_kept() {
        let request = query(Some("3"), Some(" 20 ")).resolve();
        assert_eq!(request, PageRequest { page: 3, size: 20 });
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[test]
    fn huge_parameters_stay_within_offset_range() {
        let request = query(Some("4294967295"), Some("4294967295")).resolve();
        assert_eq!(request, PageRequest { page: u32::MAX, size: MAX_PAGE_SIZE });
        assert_eq!(request.limit(), 100);
        assert_eq!(request.offset(), (i64::from(u32::MAX) - 1) * 100);

        let unclamped = PageRequest { page: u32::MAX, size: u32::MAX };
        assert!(unclamped.offset() > 0);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn page_serializes_camel_case_envelope() {
        let page = Page::new(vec![1, 2], 7, PageRequest { page: 2, size: 2 });
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "totalItems": 7,
                "totalPages": 4,
                "currentPage": 2,
                "size": 2,
                "data": [1, 2]
            })
        );
    }
}
