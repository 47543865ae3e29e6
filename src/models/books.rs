use std::collections::HashMap;

use serde::Serialize;

use crate::core::AppError;
use crate::db::storage::{Record, SqlValue};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published_year: Option<i64>,
    pub average_rating: SqlValue,
    pub ratings_count: Option<i64>,
    pub num_pages: Option<i64>,
    pub popularity_score: SqlValue,
}

impl Book {
    pub fn from_record(record: &Record) -> Result<Self, AppError> {
        let id = record
            .get_i64("id")
            .ok_or_else(|| AppError::internal_error("book row without an id"))?;

        Ok(Self {
            id,
            title: record.get_string("title"),
            description: record.get_string("description"),
            thumbnail_url: record.get_string("thumbnail_url"),
            published_year: record.get_i64("published_year"),
            average_rating: record.get("average_rating").cloned().unwrap_or(SqlValue::Null),
            ratings_count: record.get_i64("ratings_count"),
            num_pages: record.get_i64("num_pages"),
            popularity_score: record
                .get("popularity_score")
                .cloned()
                .unwrap_or(SqlValue::Null),
        })
    }
}

/// A book as returned by `GET /books` and `GET /books/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogBook {
    #[serde(flatten)]
    pub book: Book,
    pub isbn13: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

impl CatalogBook {
    pub fn from_record(
        record: &Record,
        authors: &mut BookNames,
        categories: &mut BookNames,
    ) -> Result<Self, AppError> {
        let book = Book::from_record(record)?;
        Ok(Self {
            isbn13: record.get_string("isbn13"),
            authors: authors.take(book.id),
            categories: categories.take(book.id),
            book,
        })
    }
}

/// A stats highlight: the book plus its authors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedBook {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogStats {
    pub total_books: i64,
    pub average_rating: Option<f64>,
    pub total_authors: i64,
    pub total_categories: i64,
    pub top_rated_book: Option<RankedBook>,
    pub most_popular_book: Option<RankedBook>,
}

/// Names per book id from `(book_id, name)` rows. Each list keeps the order in
/// which names first appeared and holds no duplicates.
#[derive(Debug, Default)]
pub struct BookNames {
    names: HashMap<i64, Vec<String>>,
}

impl BookNames {
    pub fn from_records(records: &[Record]) -> Self {
        let mut names: HashMap<i64, Vec<String>> = HashMap::new();
        for record in records {
            let (Some(book_id), Some(name)) = (record.get_i64("book_id"), record.get_string("name"))
            else {
                continue;
            };
            let entry = names.entry(book_id).or_default();
            if !entry.contains(&name) {
                entry.push(name);
            }
        }
        Self { names }
    }

    pub fn take(&mut self, book_id: i64) -> Vec<String> {
        self.names.remove(&book_id).unwrap_or_default()
    }
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
