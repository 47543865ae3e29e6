use crate::core::{AppConfig, CatalogSettings};
use crate::db::{CatalogStore, MySqlCatalogStore};
use crate::routes::catalog_routes;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, web::Data, App, HttpServer};
use sqlx::mysql::MySqlPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct CatalogWebServer {
    port: u16,
    server: Server,
}

impl CatalogWebServer {
    pub async fn build(configuration: AppConfig) -> Result<Self, anyhow::Error> {
        let mysql_pool = MySqlPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(5))
            .max_connections(configuration.db_max_connections)
            .connect_lazy_with(configuration.connect()?);

        let listener = TcpListener::bind(&configuration.http_listen)?;
        let port = listener.local_addr()?.port();

        let store: Arc<dyn CatalogStore> = Arc::new(MySqlCatalogStore::new(mysql_pool));
        let server = run(listener, store, configuration.catalog_settings())?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CatalogStore>,
    settings: CatalogSettings,
) -> Result<Server, anyhow::Error> {
    let store = Data::from(store);
    let settings = Data::new(settings);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT]);
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(catalog_routes)
            .app_data(store.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
