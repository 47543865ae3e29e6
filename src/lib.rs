pub mod catalog_web_server;
pub mod core;
pub mod db;
pub mod models;
pub mod routes;
