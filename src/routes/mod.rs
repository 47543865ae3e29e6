use actix_web::web::{self, scope, ServiceConfig};
use actix_web::{Resource, Scope};

use books::{catalog_stats, list_books, method_not_allowed, not_found, show_book};
use crate::routes::health_check::*;

mod books;
mod health_check;

/// A GET-only resource; any other method answers 405.
fn read_only<F, Args>(path: &str, handler: F) -> Resource
where
    F: actix_web::Handler<Args>,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    web::resource(path)
        .route(web::get().to(handler))
        .default_service(web::to(method_not_allowed))
}

fn books_routes() -> Scope {
    scope("/books")
        .service(read_only("", list_books))
        // registered ahead of "/{id}" so the literal segment wins
        .service(read_only("/stats", catalog_stats))
        .service(read_only("/{id}", show_book))
        .default_service(web::to(not_found))
}

pub fn catalog_routes(conf: &mut ServiceConfig) {
    conf.service(
        scope("")
            .service(books_routes())
            .service(health_check)
            .default_service(web::to(not_found)),
    );
}
