use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    core::{with_deadline, AppError, CatalogSettings},
    db::{books, CatalogStore},
    models::list_params::BookListParams,
};

#[instrument(name = "List Books", skip(store, settings, query))]
pub async fn list_books(
    store: web::Data<dyn CatalogStore>,
    settings: web::Data<CatalogSettings>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<impl Responder, AppError> {
    let params = BookListParams::from_query(&query, settings.max_page_size)?;

    let page = with_deadline(
        settings.request_timeout,
        books::fetch_books(store.get_ref(), &params),
    )
    .await?;

    Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "Show Book", skip(store, settings))]
pub async fn show_book(
    store: web::Data<dyn CatalogStore>,
    settings: web::Data<CatalogSettings>,
    book_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let book_id = parse_book_id(&book_id)?;

    let book = with_deadline(
        settings.show_timeout,
        books::fetch_book(store.get_ref(), book_id),
    )
    .await?;

    Ok(HttpResponse::Ok().json(book))
}

#[instrument(name = "Catalog Stats", skip(store, settings))]
pub async fn catalog_stats(
    store: web::Data<dyn CatalogStore>,
    settings: web::Data<CatalogSettings>,
) -> Result<impl Responder, AppError> {
    let stats = with_deadline(
        settings.request_timeout,
        books::fetch_catalog_stats(store.get_ref()),
    )
    .await?;

    Ok(HttpResponse::Ok().json(stats))
}

pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::method_not_allowed())
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::not_found("Not found"))
}

fn parse_book_id(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::bad_request("id", "id must be a positive integer")),
    }
}
