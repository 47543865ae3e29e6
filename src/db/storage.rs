use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Serialize, Serializer};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Column, MySql, MySqlPool, Row, TypeInfo};
use tokio::sync::Mutex;

use crate::core::AppError;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Float(f64),
    Text(String),
}

/// A column value, typed after the column's MySQL type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::UInt(v) => i64::try_from(*v).ok(),
            SqlValue::Decimal(v) => v.to_i64(),
            SqlValue::Text(v) => v.trim().parse().ok(),
            SqlValue::Null | SqlValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(v) => Some(*v as f64),
            SqlValue::UInt(v) => Some(*v as f64),
            SqlValue::Float(v) => Some(*v),
            SqlValue::Decimal(v) => v.to_f64(),
            SqlValue::Text(v) => v.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::UInt(v) => Some(v.to_string()),
            SqlValue::Float(v) => Some(v.to_string()),
            SqlValue::Decimal(v) => Some(v.to_string()),
            SqlValue::Text(v) => Some(v.clone()),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Int(v) => serializer.serialize_i64(*v),
            SqlValue::UInt(v) => serializer.serialize_u64(*v),
            SqlValue::Float(v) => serializer.serialize_f64(*v),
            SqlValue::Decimal(v) => match v.to_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => serializer.serialize_str(&v.to_string()),
            },
            SqlValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// One result row; columns keep their select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SqlValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(SqlValue::as_f64)
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(SqlValue::as_string)
    }

    fn from_mysql_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        let mut columns = Vec::with_capacity(row.columns().len());
        for column in row.columns() {
            let value = decode_column(row, column.ordinal(), column.type_info().name())?;
            columns.push((column.name().to_string(), value));
        }
        Ok(Self { columns })
    }
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<SqlValue, sqlx::Error> {
    let type_name = type_name.to_ascii_uppercase();

    let value = if type_name.ends_with("UNSIGNED") {
        row.try_get::<Option<u64>, _>(index)?.map(SqlValue::UInt)
    } else {
        match type_name.as_str() {
            "NULL" => None,
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                row.try_get::<Option<i64>, _>(index)?.map(SqlValue::Int)
            }
            "YEAR" => row
                .try_get_unchecked::<Option<i64>, _>(index)?
                .map(SqlValue::Int),
            "FLOAT" => row
                .try_get::<Option<f32>, _>(index)?
                .map(|v| SqlValue::Float(v as f64)),
            "DOUBLE" => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::Float),
            "DECIMAL" => row
                .try_get::<Option<BigDecimal>, _>(index)?
                .map(SqlValue::Decimal),
            _ => match row.try_get::<Option<String>, _>(index) {
                Ok(text) => text.map(SqlValue::Text),
                Err(_) => row
                    .try_get::<Option<Vec<u8>>, _>(index)?
                    .map(|bytes| SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())),
            },
        }
    };

    Ok(value.unwrap_or(SqlValue::Null))
}

/// Read-only gateway to the catalog database.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Executes `sql` with `params` bound positionally. No retries.
    async fn select(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, AppError>;

    /// A store bound to one connection, held until the returned value drops.
    /// Every statement of a single lookup goes through it.
    async fn session<'a>(&'a self) -> Result<Box<dyn CatalogStore + 'a>, AppError>;
}

/// Hands out the store it wraps as its own session.
pub struct Shared<'a>(pub &'a dyn CatalogStore);

#[async_trait]
impl CatalogStore for Shared<'_> {
    async fn select(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, AppError> {
        self.0.select(sql, params).await
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn CatalogStore + 'a>, AppError> {
        Ok(Box::new(Shared(self.0)))
    }
}

pub struct MySqlCatalogStore {
    pool: MySqlPool,
}

impl MySqlCatalogStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn bind_params<'q>(sql: &'q str, params: &'q [SqlParam]) -> Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn into_records(rows: Result<Vec<MySqlRow>, sqlx::Error>) -> Result<Vec<Record>, AppError> {
    let rows = rows.map_err(|e| {
        tracing::error!("Failed to execute catalog query: {:?}", e);
        AppError::db_error(e)
    })?;

    rows.iter()
        .map(Record::from_mysql_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::db_error)
}

#[async_trait]
impl CatalogStore for MySqlCatalogStore {
    async fn select(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, AppError> {
        into_records(bind_params(sql, params).fetch_all(&self.pool).await)
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn CatalogStore + 'a>, AppError> {
        let connection = self.pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire a catalog connection: {:?}", e);
            AppError::db_error(e)
        })?;

        Ok(Box::new(MySqlSession {
            connection: Mutex::new(connection),
        }))
    }
}

/// One pooled connection, returned to the pool on drop.
struct MySqlSession {
    connection: Mutex<PoolConnection<MySql>>,
}

#[async_trait]
impl CatalogStore for MySqlSession {
    async fn select(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, AppError> {
        let mut connection = self.connection.lock().await;
        into_records(bind_params(sql, params).fetch_all(&mut **connection).await)
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn CatalogStore + 'a>, AppError> {
        Ok(Box::new(Shared(self)))
    }
}
