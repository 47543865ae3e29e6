use unicode_segmentation::UnicodeSegmentation;

use crate::core::AppError;
use crate::db::query_compiler::{SortColumn, SortOrder};

pub const MAX_SEARCH_LENGTH: usize = 200;
pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_YEAR: i32 = 9999;
pub const MAX_RATING: f64 = 5.0;

/// Normalized `GET /books` parameters. Every optional filter is either absent
/// or present and within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BookListParams {
    pub search: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub min_rating: Option<f64>,
    pub min_pages: Option<u32>,
    pub max_pages: Option<u32>,
    pub categories: Vec<String>,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub per_page: u32,
    pub page: u64,
}

impl Default for BookListParams {
    fn default() -> Self {
        Self {
            search: None,
            year_min: None,
            year_max: None,
            min_rating: None,
            min_pages: None,
            max_pages: None,
            categories: Vec::new(),
            sort_by: SortColumn::default(),
            sort_order: SortOrder::default(),
            per_page: DEFAULT_PER_PAGE,
            page: 1,
        }
    }
}

impl BookListParams {
    /// Builds parameters from raw query pairs. Malformed optional filters are
    /// dropped; only a `page` or `per_page` that is not a positive integer is
    /// rejected.
    pub fn from_query(pairs: &[(String, String)], max_page_size: u32) -> Result<Self, AppError> {
        let last = |key: &str| last_value(pairs, key);

        let (year_min, year_max) = ordered(
            last("year_min").and_then(|v| bounded_int(v, 0, MAX_YEAR)),
            last("year_max").and_then(|v| bounded_int(v, 0, MAX_YEAR)),
        );
        let (min_pages, max_pages) = ordered(
            last("min_pages").and_then(|v| v.parse::<u32>().ok()),
            last("max_pages").and_then(|v| v.parse::<u32>().ok()),
        );

        let per_page = match last("per_page") {
            Some(raw) => positive_integer("per_page", raw)?.min(max_page_size.max(1) as u64) as u32,
            None => DEFAULT_PER_PAGE.min(max_page_size.max(1)),
        };
        let page = match last("page") {
            Some(raw) => positive_integer("page", raw)?,
            None => 1,
        };
        if (page - 1).checked_mul(per_page as u64).is_none() {
            return Err(AppError::bad_request("page", "page is out of range"));
        }

        Ok(Self {
            search: last("search").map(truncate_search),
            year_min,
            year_max,
            min_rating: last("min_rating").and_then(rating),
            min_pages,
            max_pages,
            categories: categories(pairs),
            sort_by: last("sort_by")
                .and_then(SortColumn::parse)
                .unwrap_or_default(),
            sort_order: last("sort_order")
                .and_then(SortOrder::parse)
                .unwrap_or_default(),
            per_page,
            page,
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page as u64
    }
}

/// Repeated keys resolve to their last non-blank value.
fn last_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .find(|v| !v.is_empty())
}

fn truncate_search(value: &str) -> String {
    value.graphemes(true).take(MAX_SEARCH_LENGTH).collect()
}

fn bounded_int(value: &str, min: i32, max: i32) -> Option<i32> {
    value
        .parse::<i32>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn rating(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=MAX_RATING).contains(v))
}

/// Inverted ranges are swapped rather than dropped.
fn ordered<T: PartialOrd>(low: Option<T>, high: Option<T>) -> (Option<T>, Option<T>) {
    match (low, high) {
        (Some(low), Some(high)) if low > high => (Some(high), Some(low)),
        other => other,
    }
}

/// Integers and decimal text (truncated) are accepted, anything below 1 is not.
fn positive_integer(field: &str, value: &str) -> Result<u64, AppError> {
    let parsed = value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 1.0 && *v < u64::MAX as f64)
            .map(|v| v.trunc() as u64)
    });

    match parsed {
        Some(v) if v >= 1 => Ok(v),
        _ => Err(AppError::bad_request(
            field,
            format!("{} must be a positive integer", field),
        )),
    }
}

/// `categories=a,b`, `categories=a&categories=b` and `categories[]=a` all work.
fn categories(pairs: &[(String, String)]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    let values = pairs
        .iter()
        .filter(|(k, _)| k == "categories" || k == "categories[]")
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    for value in values {
        if !categories.iter().any(|existing| existing == value) {
            categories.push(value.to_string());
        }
    }
    categories
}
