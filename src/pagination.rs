//! Fixed-size pages over an ordered record set.
//!
//! Page numbers come straight from the `page` query parameter, so
//! [`Paginator::page`] never fails:
//!
//! | Requested page | Result |
//! |----------------|--------|
//! | missing or not an integer | page 1 |
//! | `1..=num_pages` | that page |
//! | above `num_pages`, or below 1 | the last page |
//!
//! An empty record set still has one (empty) page.

use serde::Serialize;

/// One page of results plus the numbers a pagination widget needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    /// Total number of records across all pages.
    pub count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Transform the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            per_page: self.per_page,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    /// Create a paginator. A `per_page` of zero is treated as one.
    pub fn new(per_page: usize) -> Self {
        Paginator {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of pages needed for `count` records (at least one).
    pub fn num_pages(&self, count: usize) -> usize {
        count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `page` parameter against `count` records.
    pub fn resolve(&self, raw: Option<&str>, count: usize) -> usize {
        let num_pages = self.num_pages(count);
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(s) => match s.parse::<i64>() {
                Ok(n) if n >= 1 && (n as u64) <= num_pages as u64 => n as usize,
                Ok(_) => num_pages,
                // Integers past i64 are still out of range, not garbage.
                Err(_) if is_integer(s) => num_pages,
                Err(_) => 1,
            },
        }
    }

    /// Cut `items` (already filtered and ordered) into the requested page.
    pub fn page<T>(&self, items: Vec<T>, raw: Option<&str>) -> Page<T> {
        let count = items.len();
        let num_pages = self.num_pages(count);
        let number = self.resolve(raw, count);

        let start = (number - 1) * self.per_page;
        let items: Vec<T> = items.into_iter().skip(start).take(self.per_page).collect();

        Page {
            items,
            number,
            num_pages,
            per_page: self.per_page,
            count,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }
}

/// Optionally signed run of ASCII digits, of any length.
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
