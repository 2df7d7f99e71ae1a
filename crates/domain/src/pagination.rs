use serde::{Deserialize, Serialize};

/// Page sizes offered by list screens.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Current page and page size of a list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WirePagination")]
pub struct Pagination {
    page_num: u32,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePagination {
    #[serde(default)]
    page_num: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<WirePagination> for Pagination {
    fn from(wire: WirePagination) -> Self {
        Self::new(wire.page_num, wire.page_size)
    }
}

impl Pagination {
    /// Creates pagination, clamping both values to at least one.
    #[must_use]
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num: page_num.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Creates first-page pagination with the given page size.
    #[must_use]
    pub fn with_page_size(page_size: u32) -> Self {
        Self::new(1, page_size)
    }

    /// Returns the one-based page number.
    #[must_use]
    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    /// Returns the page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the same page size on page one.
    #[must_use]
    pub fn first_page(self) -> Self {
        Self::new(1, self.page_size)
    }

    /// Returns the number of rows before the current page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns how many pages `total` rows span; at least one.
    #[must_use]
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size)).max(1)
    }

    /// Returns true when the page size is one of [`PAGE_SIZE_OPTIONS`].
    #[must_use]
    pub fn is_standard_page_size(&self) -> bool {
        PAGE_SIZE_OPTIONS.contains(&self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn zero_values_are_clamped() {
        let pagination = Pagination::new(0, 0);
        assert_eq!(pagination.page_num(), 1);
        assert_eq!(pagination.page_size(), 1);
    }

    #[test]
    fn first_page_keeps_page_size() {
        let pagination = Pagination::new(7, 50).first_page();
        assert_eq!(pagination, Pagination::new(1, 50));
    }

    #[test]
    fn page_count_rounds_up() {
        let pagination = Pagination::new(1, 20);
        assert_eq!(pagination.page_count(0), 1);
        assert_eq!(pagination.page_count(41), 3);
        assert_eq!(Pagination::new(3, 20).offset(), 40);
    }

    #[test]
    fn decoding_applies_the_same_clamp() {
        let decoded: Result<Pagination, _> =
            serde_json::from_str(r#"{"pageNum":0,"pageSize":0}"#);
        let Ok(pagination) = decoded else {
            panic!("pagination should decode");
        };
        assert_eq!(pagination, Pagination::new(1, 1));
        assert_eq!(pagination.offset(), 0);

        let decoded: Result<Pagination, _> = serde_json::from_str(r#"{"pageNum":3}"#);
        assert!(matches!(decoded, Ok(pagination) if pagination == Pagination::new(3, 10)));
    }

    #[test]
    fn non_standard_page_size_is_reported() {
        assert!(Pagination::new(1, 20).is_standard_page_size());
        assert!(!Pagination::new(1, 33).is_standard_page_size());
    }
}
