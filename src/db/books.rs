use tracing::instrument;

use super::query_compiler::{
    compile_list_query, compile_names_query, compile_show_query, compile_top_book_query,
    NameTable, SortColumn, AVERAGE_RATING_SQL, TOTAL_AUTHORS_SQL, TOTAL_BOOKS_SQL,
    TOTAL_CATEGORIES_SQL,
};
use super::storage::{CatalogStore, Record};
use crate::core::AppError;
use crate::models::books::{
    round_to_cents, Book, BookNames, CatalogBook, CatalogStats, RankedBook,
};
use crate::models::list_params::BookListParams;
use crate::models::pagination::{PaginatedResponse, PaginationMeta};

#[instrument(name = "Fetch book page", skip(store, params), fields(page = params.page, per_page = params.per_page))]
pub async fn fetch_books(
    store: &dyn CatalogStore,
    params: &BookListParams,
) -> Result<PaginatedResponse<CatalogBook>, AppError> {
    let session = store.session().await?;
    let store = session.as_ref();
    let compiled = compile_list_query(params);

    let rows = store.select(&compiled.data_sql, &compiled.params).await?;
    let total = scalar(&store.select(&compiled.count_sql, &compiled.params).await?, "total")?;

    let book_ids = rows
        .iter()
        .map(|row| {
            row.get_i64("id")
                .ok_or_else(|| AppError::internal_error("book row without an id"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut authors = fetch_names(store, NameTable::Authors, &book_ids).await?;
    let mut categories = fetch_names(store, NameTable::Categories, &book_ids).await?;

    let data = rows
        .iter()
        .map(|row| CatalogBook::from_record(row, &mut authors, &mut categories))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResponse {
        data,
        pagination: PaginationMeta::new(params.page, params.per_page, total.max(0) as u64),
    })
}

#[instrument(name = "Fetch book", skip(store))]
pub async fn fetch_book(store: &dyn CatalogStore, book_id: i64) -> Result<CatalogBook, AppError> {
    let session = store.session().await?;
    let store = session.as_ref();
    let statement = compile_show_query(book_id);
    let rows = store.select(&statement.sql, &statement.params).await?;
    let row = rows
        .first()
        .ok_or_else(|| AppError::not_found("Book not found"))?;

    let mut authors = fetch_names(store, NameTable::Authors, &[book_id]).await?;
    let mut categories = fetch_names(store, NameTable::Categories, &[book_id]).await?;

    CatalogBook::from_record(row, &mut authors, &mut categories)
}

#[instrument(name = "Fetch catalog stats", skip(store))]
pub async fn fetch_catalog_stats(store: &dyn CatalogStore) -> Result<CatalogStats, AppError> {
    let session = store.session().await?;
    let store = session.as_ref();
    let total_books = scalar(&store.select(TOTAL_BOOKS_SQL, &[]).await?, "total")?;
    let average_rating = store
        .select(AVERAGE_RATING_SQL, &[])
        .await?
        .first()
        .and_then(|row| row.get_f64("average"))
        .map(round_to_cents);
    let total_authors = scalar(&store.select(TOTAL_AUTHORS_SQL, &[]).await?, "total")?;
    let total_categories = scalar(&store.select(TOTAL_CATEGORIES_SQL, &[]).await?, "total")?;

    let top_rated_book = fetch_top_book(store, SortColumn::AverageRating).await?;
    let most_popular_book = fetch_top_book(store, SortColumn::PopularityScore).await?;

    Ok(CatalogStats {
        total_books,
        average_rating,
        total_authors,
        total_categories,
        top_rated_book,
        most_popular_book,
    })
}

async fn fetch_top_book(
    store: &dyn CatalogStore,
    column: SortColumn,
) -> Result<Option<RankedBook>, AppError> {
    let statement = compile_top_book_query(column);
    let rows = store.select(&statement.sql, &statement.params).await?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let book = Book::from_record(row)?;
    let authors = fetch_names(store, NameTable::Authors, &[book.id])
        .await?
        .take(book.id);

    Ok(Some(RankedBook { book, authors }))
}

async fn fetch_names(
    store: &dyn CatalogStore,
    table: NameTable,
    book_ids: &[i64],
) -> Result<BookNames, AppError> {
    if book_ids.is_empty() {
        return Ok(BookNames::default());
    }
    let statement = compile_names_query(table, book_ids);
    let rows = store.select(&statement.sql, &statement.params).await?;
    Ok(BookNames::from_records(&rows))
}

fn scalar(rows: &[Record], column: &str) -> Result<i64, AppError> {
    rows.first()
        .and_then(|row| row.get_i64(column))
        .ok_or_else(|| AppError::internal_error(format!("missing scalar column {}", column)))
}
