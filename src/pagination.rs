//! Fixed-size pages over an ordered, counted result set.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Where one page sits within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub per_page: u32,
    pub count: u64,
}

impl PageWindow {
    /// Saturates instead of wrapping on huge page numbers.
    pub fn offset(&self) -> u32 {
        self.number.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u32,
}

impl Paginator {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// There is always at least one page, even for an empty result.
    pub fn num_pages(&self, count: u64) -> u32 {
        let pages = count.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Missing or non-numeric input gives page 1; any number outside
    /// `1..=num_pages` gives the last page.
    pub fn window(&self, count: u64, raw_page: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match raw_page.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && n <= i64::from(num_pages) => n as u32,
            Some(Ok(_)) => num_pages,
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            count,
        }
    }
}

/// One page of items plus the metadata a paginator widget needs.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            per_page: window.per_page,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        (1..=self.num_pages).collect()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_saturates_for_huge_pages() {
        let window = PageWindow {
            number: u32::MAX,
            num_pages: u32::MAX,
            per_page: 10,
            count: u64::MAX,
        };
        assert_eq!(window.offset(), u32::MAX);

        let first = Paginator::new(10).window(25, None);
        assert_eq!(first.offset(), 0);
        assert_eq!(Paginator::new(10).window(25, Some("3")).offset(), 20);
    }

    #[test]
    fn page_numbers_resolve_like_get_page() {
        let paginator = Paginator::new(10);

        assert_eq!(paginator.window(13, None).number, 1);
        assert_eq!(paginator.window(13, Some("2")).number, 2);
        assert_eq!(paginator.window(13, Some("abc")).number, 1);
        assert_eq!(paginator.window(13, Some("")).number, 1);
        assert_eq!(paginator.window(13, Some("99")).number, 2);
        assert_eq!(paginator.window(13, Some("0")).number, 2);
        assert_eq!(paginator.window(13, Some("-4")).number, 2);
    }

    #[test]
    fn empty_results_still_have_one_page() {
        let paginator = Paginator::new(10);
        let window = paginator.window(0, Some("3"));
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.number, 1);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn second_page_of_thirteen() {
        let paginator = Paginator::new(10);
        let window = paginator.window(13, Some("2"));
        assert_eq!(window.offset(), 10);
        assert_eq!(window.limit(), 10);

        let page = Page::new(vec![11, 12, 13], window);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.previous_page_number(), Some(1));
        assert_eq!(page.next_page_number(), None);
        assert_eq!(page.page_numbers(), vec![1, 2]);
        assert!(page.has_other_pages());
    }

    #[test]
    fn map_keeps_metadata() {
        let window = Paginator::new(2).window(3, None);
        let page = Page::new(vec![1, 2], window).map(|n| n.to_string());
        assert_eq!(page.items, vec!["1", "2"]);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.count, 3);
    }
}
