//! # List-query pipeline
//!
//! Every list endpoint runs the same three stages over a snapshot of one
//! table: a predicate filter chain, a comparator chosen by sort key, and a
//! pager. Each content type only supplies a [`ListQuery`] implementation.

use std::cmp::Ordering;

use serde::de::{DeserializeOwned, Error as _, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Filter + comparator contract for one query type.
pub trait ListQuery<T> {
    /// AND of every supplied predicate. Absent parameters impose nothing.
    fn matches(&self, item: &T) -> bool;

    /// Ordering for the selected sort mode. Ties keep input order.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Raw `(page, pageSize)` as sent by the caller.
    fn paging(&self) -> (Option<u32>, Option<u32>);
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Applies defaults and clamps `page_size` to `[1, max_page_size]`.
    pub fn new(page: Option<u32>, page_size: Option<u32>, max_page_size: u32) -> Self {
        let max = max_page_size.max(1);
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, max),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_MAX_PAGE_SIZE)
    }
}

/// The `{list, total, page, pageSize}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    /// Filtered count before slicing.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Slices `[(page-1)*pageSize, page*pageSize)` out of `items`, clipped to
/// the available length. Out-of-range pages yield an empty list.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let list = items
        .into_iter()
        .skip(request.offset())
        .take(request.page_size as usize)
        .collect();
    Page {
        list,
        total,
        page: request.page,
        page_size: request.page_size,
    }
}

/// Filter, stable-sort, then paginate.
pub fn run_query<T, Q>(items: Vec<T>, query: &Q, max_page_size: u32) -> Page<T>
where
    Q: ListQuery<T>,
{
    let (page, page_size) = query.paging();
    paginate(
        filter_sorted(items, query),
        PageRequest::new(page, page_size, max_page_size),
    )
}

/// The first two stages only: every match, in sort order.
pub fn filter_sorted<T, Q>(items: Vec<T>, query: &Q) -> Vec<T>
where
    Q: ListQuery<T>,
{
    let mut filtered: Vec<T> = items.into_iter().filter(|item| query.matches(item)).collect();
    // `sort_by` is stable: exact ties keep storage order.
    filtered.sort_by(|a, b| query.compare(a, b));
    filtered
}

/// Case-insensitive substring match with OR semantics across `fields`.
/// A missing or blank keyword matches everything.
pub fn keyword_matches<'a>(
    keyword: Option<&str>,
    fields: impl IntoIterator<Item = &'a str>,
) -> bool {
    let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) else {
        return true;
    };
    let needle = keyword.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Inclusive numeric range check. Absent bounds are open.
pub fn within<N: PartialOrd>(value: N, min: Option<N>, max: Option<N>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// An enum-valued filter where `"all"` (or an empty string) means no
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Selector::All => None,
            Selector::Only(wanted) => Some(wanted),
        }
    }
}

impl<T> From<Option<T>> for Selector<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selector::All, Selector::Only)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Selector<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Selector::All);
        }
        let inner: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
            raw.into_deserializer();
        T::deserialize(inner)
            .map(Selector::Only)
            .map_err(D::Error::custom)
    }
}

/// Descending comparison helper for sort modes that rank "most first".
pub fn desc<K: Ord>(a: K, b: K) -> Ordering {
    b.cmp(&a)
}

/// Optional keys sorted ascending with `None` last.
pub fn asc_nulls_last<K: Ord>(a: Option<K>, b: Option<K>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
