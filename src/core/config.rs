use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub db_dsn: Secret<String>,
    pub http_listen: String,
    pub request_timeout_ms: u64,
    pub show_timeout_ms: u64,
    pub max_page_size: u32,
    pub db_max_connections: u32,
    pub log_dir: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        let config_dir = base_path.join("src/core/configurations");

        let app_environment: Environment = std::env::var("BOOK_CATALOG_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let configurations = config::Config::builder()
            .set_default("http_listen", "127.0.0.1:8000")?
            .set_default("request_timeout_ms", 10_000_i64)?
            .set_default("show_timeout_ms", 2_000_i64)?
            .set_default("max_page_size", 100_i64)?
            .set_default("db_max_connections", 10_i64)?
            .set_default("log_dir", "/var/tmp/log/book_catalog")?
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(false),
            )
            // DB_DSN, HTTP_LISTEN, REQUEST_TIMEOUT_MS, ... map onto the lowercase keys
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        configurations.try_deserialize()
    }

    pub fn connect(&self) -> Result<MySqlConnectOptions, sqlx::Error> {
        let options = MySqlConnectOptions::from_str(self.db_dsn.expose_secret())?;

        Ok(options.log_statements(tracing::log::LevelFilter::Trace))
    }

    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            show_timeout: Duration::from_millis(self.show_timeout_ms),
            max_page_size: self.max_page_size.max(1),
        }
    }
}

/// Per-request limits shared with every handler.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub request_timeout: Duration,
    pub show_timeout: Duration,
    pub max_page_size: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            show_timeout: Duration::from_secs(2),
            max_page_size: 100,
        }
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not supported environment. Use either `local` or `production`",
                other
            )),
        }
    }
}
