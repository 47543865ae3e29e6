//! Turns validated list parameters into parameterized SQL.
//!
//! Only fixed text from this module ever reaches the SQL string: column names
//! and sort keywords come from the enums below, placeholder lists are built
//! from counts, and `LIMIT`/`OFFSET` are validated integers. Every user value
//! travels in the parameter vector.

use super::storage::SqlParam;
use crate::models::list_params::BookListParams;

const BOOK_COLUMNS: &str = "books.id, books.title, books.description, books.thumbnail_url, \
     books.published_year, books.average_rating, books.ratings_count, books.num_pages, \
     books.popularity_score";

const LIST_JOINS: &str = "LEFT JOIN authors ON books.id = authors.books_id \
     LEFT JOIN book_detail ON books.id = book_detail.book_id";

/// Columns a list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Title,
    AverageRating,
    PublishedYear,
    NumPages,
    #[default]
    PopularityScore,
    RatingsCount,
}

impl SortColumn {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "average_rating" => Some(Self::AverageRating),
            "published_year" => Some(Self::PublishedYear),
            "num_pages" => Some(Self::NumPages),
            "popularity_score" => Some(Self::PopularityScore),
            "ratings_count" => Some(Self::RatingsCount),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::AverageRating => "average_rating",
            Self::PublishedYear => "published_year",
            Self::NumPages => "num_pages",
            Self::PopularityScore => "popularity_score",
            Self::RatingsCount => "ratings_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Data and count statements for one list request. Both take `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledListQuery {
    pub data_sql: String,
    pub count_sql: String,
    pub params: Vec<SqlParam>,
}

/// A single statement with its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Tables holding per-book names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTable {
    Authors,
    Categories,
}

impl NameTable {
    fn columns(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Authors => ("authors", "books_id", "author_name"),
            Self::Categories => ("categories", "book_id", "category_name"),
        }
    }
}

#[derive(Default)]
struct Conjunction {
    predicates: Vec<String>,
    params: Vec<SqlParam>,
}

impl Conjunction {
    fn push(&mut self, predicate: impl Into<String>, params: impl IntoIterator<Item = SqlParam>) {
        self.predicates.push(predicate.into());
        self.params.extend(params);
    }

    fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Escapes `LIKE` wildcards so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn predicates(params: &BookListParams) -> Conjunction {
    let mut conjunction = Conjunction::default();

    if let Some(search) = &params.search {
        let pattern = format!("%{}%", escape_like(search));
        conjunction.push(
            "(books.title LIKE ? OR books.description LIKE ? \
             OR authors.author_name LIKE ? OR book_detail.isbn13 LIKE ?)",
            std::iter::repeat(SqlParam::Text(pattern)).take(4),
        );
    }
    if let Some(year_min) = params.year_min {
        conjunction.push("books.published_year >= ?", [SqlParam::Int(year_min.into())]);
    }
    if let Some(year_max) = params.year_max {
        conjunction.push("books.published_year <= ?", [SqlParam::Int(year_max.into())]);
    }
    if let Some(min_rating) = params.min_rating {
        conjunction.push("books.average_rating >= ?", [SqlParam::Float(min_rating)]);
    }
    if let Some(min_pages) = params.min_pages {
        conjunction.push("books.num_pages >= ?", [SqlParam::Int(min_pages.into())]);
    }
    if let Some(max_pages) = params.max_pages {
        conjunction.push("books.num_pages <= ?", [SqlParam::Int(max_pages.into())]);
    }
    if !params.categories.is_empty() {
        conjunction.push(
            format!(
                "books.id IN (SELECT book_id FROM categories WHERE category_name IN ({}))",
                placeholders(params.categories.len())
            ),
            params
                .categories
                .iter()
                .map(|category| SqlParam::Text(category.clone())),
        );
    }

    conjunction
}

pub fn compile_list_query(params: &BookListParams) -> CompiledListQuery {
    let conjunction = predicates(params);
    let where_clause = conjunction.where_clause();

    let data_sql = format!(
        "SELECT {columns}, book_detail.isbn13 FROM books {joins}{where_clause} \
         GROUP BY {columns}, book_detail.isbn13 \
         ORDER BY books.{sort} {order}, books.id ASC \
         LIMIT {limit} OFFSET {offset}",
        columns = BOOK_COLUMNS,
        joins = LIST_JOINS,
        where_clause = where_clause,
        sort = params.sort_by.column(),
        order = params.sort_order.keyword(),
        limit = params.per_page,
        offset = params.offset(),
    );

    let count_sql = if conjunction.is_empty() {
        "SELECT COUNT(*) AS total FROM books".to_string()
    } else {
        format!(
            "SELECT COUNT(DISTINCT books.id) AS total FROM books {}{}",
            LIST_JOINS, where_clause
        )
    };

    CompiledListQuery {
        data_sql,
        count_sql,
        params: conjunction.params,
    }
}

pub fn compile_show_query(book_id: i64) -> Statement {
    Statement {
        sql: format!(
            "SELECT {}, book_detail.isbn13 FROM books \
             LEFT JOIN book_detail ON books.id = book_detail.book_id \
             WHERE books.id = ? LIMIT 1",
            BOOK_COLUMNS
        ),
        params: vec![SqlParam::Int(book_id)],
    }
}

/// Names for a set of books, projected as `(book_id, name)` in insertion order
/// (the table's `id`) so repeated lookups list names identically.
pub fn compile_names_query(table: NameTable, book_ids: &[i64]) -> Statement {
    let (table_name, key, name) = table.columns();
    Statement {
        sql: format!(
            "SELECT {table}.{key} AS book_id, {table}.{name} AS name FROM {table} \
             WHERE {table}.{key} IN ({placeholders}) \
             ORDER BY {table}.{key}, {table}.id",
            table = table_name,
            key = key,
            name = name,
            placeholders = placeholders(book_ids.len()),
        ),
        params: book_ids.iter().copied().map(SqlParam::Int).collect(),
    }
}

pub const TOTAL_BOOKS_SQL: &str = "SELECT COUNT(*) AS total FROM books";
pub const AVERAGE_RATING_SQL: &str = "SELECT AVG(average_rating) AS average FROM books";
pub const TOTAL_AUTHORS_SQL: &str =
    "SELECT COUNT(DISTINCT author_name) AS total FROM authors";
pub const TOTAL_CATEGORIES_SQL: &str =
    "SELECT COUNT(DISTINCT category_name) AS total FROM categories";

/// Highest-ranked book by `column`, ties to more ratings then lower id.
pub fn compile_top_book_query(column: SortColumn) -> Statement {
    Statement {
        sql: format!(
            "SELECT {} FROM books \
             ORDER BY books.{} DESC, books.ratings_count DESC, books.id ASC LIMIT 1",
            BOOK_COLUMNS,
            column.column()
        ),
        params: Vec::new(),
    }
}
