//! End-to-end tests against a live MySQL server.
//!
//! Each test seeds a fresh database through `TEST_DB_DSN`, so they are all
//! `#[ignore]`d and only run with `cargo test -- --ignored`. Without a server,
//! plain `cargo test` runs none of them. That covers per-row filters, sort
//! order across pages, count and list agreement, and byte-identical repeated
//! responses. The unit tests in `src/` check the same paths against a scripted
//! store and cannot see real MySQL collation or row order.
mod books;
mod helpers;
