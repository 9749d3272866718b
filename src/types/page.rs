//! Paginated listing result

use serde::{Deserialize, Serialize};

/// One page of a listing plus the metadata a boundary layer needs to render it
///
/// `total_pages` is `ceil(total_elements / size)`, which is zero for an empty
/// listing. `first` and `last` are derived from the requested page alone, so a
/// page past the end reports `last == true` with empty content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    /// Build a page, deriving the page count and boundary flags
    ///
    /// `size` must be non-zero; callers validate it before listing.
    pub fn new(content: Vec<T>, page: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = total_elements.div_ceil(size);
        Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
            first: page == 0,
            last: page + 1 >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, 0, 10, 0, true, true)]
    #[case::exact_fit(0, 20, 10, 2, true, false)]
    #[case::partial_last(2, 25, 10, 3, false, true)]
    #[case::middle(1, 25, 10, 3, false, false)]
    #[case::past_end(5, 25, 10, 3, false, true)]
    #[case::single_element(0, 1, 100, 1, true, true)]
    fn test_page_metadata(
        #[case] page: u64,
        #[case] total: u64,
        #[case] size: u64,
        #[case] expected_pages: u64,
        #[case] expected_first: bool,
        #[case] expected_last: bool,
    ) {
        let result: Page<u32> = Page::new(Vec::new(), page, size, total);
        assert_eq!(result.total_pages, expected_pages);
        assert_eq!(result.first, expected_first);
        assert_eq!(result.last, expected_last);
    }

    #[test]
    fn test_page_serializes_with_boundary_field_names() {
        let page = Page::new(vec![1, 2], 0, 2, 3);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 3);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["first"], true);
        assert_eq!(json["last"], false);
    }
}
