//! Feed Aggregate: merge of both sources into one date-ordered page

use serde::Serialize;
use crate::domain::aggregates::product::Product;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 20;

/// Page coordinates, always at least 1 each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest { page: usize, per_page: usize }

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self { Self { page: page.max(1), per_page: per_page.max(1) } }

    /// Query-string values, read like `parseInt`: leading integer, garbage after it ignored.
    /// Unparseable input takes the defaults; anything below 1 clamps to 1.
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Self {
        let page = page.and_then(parse_leading_int).unwrap_or(DEFAULT_PAGE as i64);
        let per_page = per_page.and_then(parse_leading_int).unwrap_or(DEFAULT_PER_PAGE as i64);
        Self::new(clamp_positive(page), clamp_positive(per_page))
    }

    pub fn page(&self) -> usize { self.page }
    pub fn per_page(&self) -> usize { self.per_page }
    pub fn offset(&self) -> usize { (self.page - 1).saturating_mul(self.per_page) }
}

impl Default for PageRequest { fn default() -> Self { Self::new(DEFAULT_PAGE, DEFAULT_PER_PAGE) } }

fn clamp_positive(value: i64) -> usize { usize::try_from(value.max(1)).unwrap_or(usize::MAX) }

fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 { return None; }
    // Overflow saturates so absurd page numbers land past the end instead of on page 1.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// One page of the unified feed.
#[derive(Clone, Debug, Serialize)]
pub struct FeedPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub pages: usize,
    pub current_page: usize,
    pub per_page: usize,
}

/// Remote entries go first so that, under the stable sort, they win
/// timestamp ties against catalog entries.
pub fn merge_page(remote: Vec<Product>, catalog: Vec<Product>, request: PageRequest) -> FeedPage {
    let mut merged = remote;
    merged.extend(catalog);
    merged.sort_by(|a, b| b.date_created_timestamp.cmp(&a.date_created_timestamp));

    let total = merged.len();
    let products = merged.into_iter().skip(request.offset()).take(request.per_page()).collect();
    FeedPage {
        products,
        total,
        pages: total.div_ceil(request.per_page()),
        current_page: request.page(),
        per_page: request.per_page(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{Product, RawProduct};
    use crate::domain::value_objects::EpochMillis;
    use serde_json::json;

    fn remote(title: &str, ts: i64) -> Product {
        Product::from_remote(RawProduct::from_value(json!({"id": title, "title": title, "date_created_timestamp": ts})), EpochMillis::new(0))
    }

    fn catalog(count: usize) -> Vec<Product> {
        (0..count).map(|i| Product::from_catalog(RawProduct::from_value(json!({"_id": format!("c{i}"), "title": format!("c{i}")})), i)).collect()
    }

    fn titles(products: &[Product]) -> Vec<String> { products.iter().map(|p| p.title.clone()).collect() }

    #[test]
    fn test_parse_defaults_and_clamps() {
        assert_eq!(PageRequest::parse(None, None), PageRequest::new(1, 20));
        assert_eq!(PageRequest::parse(Some("abc"), Some("")), PageRequest::new(1, 20));
        assert_eq!(PageRequest::parse(Some("0"), Some("-5")), PageRequest::new(1, 1));
        assert_eq!(PageRequest::parse(Some(" 3rd"), Some("12px")), PageRequest::new(3, 12));
        assert_eq!(PageRequest::parse(Some("+2"), Some("0")), PageRequest::new(2, 1));
    }

    #[test]
    fn test_parse_huge_page_lands_past_the_end() {
        let request = PageRequest::parse(Some("99999999999999999999999"), Some("20"));
        let page = merge_page(vec![], catalog(3), request);
        assert!(page.products.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_merge_orders_across_pages() {
        let remote = vec![remote("old", 1_600_000_000), remote("new", 1_750_000_000), remote("mid", 1_704_067_198_500)];
        let all = merge_page(remote.clone(), catalog(4), PageRequest::new(1, 100));
        let expected = titles(&all.products);
        assert_eq!(expected, vec!["new", "c0", "c1", "mid", "c2", "c3", "old"]);

        let mut paged = Vec::new();
        for page in 1..=3 {
            let p = merge_page(remote.clone(), catalog(4), PageRequest::new(page, 3));
            assert_eq!(p.pages, 3);
            assert_eq!(p.total, 7);
            paged.extend(titles(&p.products));
        }
        assert_eq!(paged, expected);
    }

    #[test]
    fn test_remote_wins_ties() {
        let tie = remote("remote", 1_704_067_200_000);
        let page = merge_page(vec![tie], catalog(1), PageRequest::default());
        assert_eq!(titles(&page.products), vec!["remote", "c0"]);
    }

    #[test]
    fn test_page_beyond_end_is_empty() {
        let page = merge_page(vec![], catalog(5), PageRequest::new(4, 2));
        assert!(page.products.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 4);
    }

    #[test]
    fn test_empty_feed() {
        let page = merge_page(vec![], vec![], PageRequest::default());
        assert_eq!((page.total, page.pages), (0, 0));
    }
}
