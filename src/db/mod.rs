pub mod books;
pub mod query_compiler;
pub mod storage;

pub use storage::{CatalogStore, MySqlCatalogStore, Record, SqlParam, SqlValue};
