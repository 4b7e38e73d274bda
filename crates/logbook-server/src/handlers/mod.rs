//! Axum route handlers.
//!
//! Ledger calls are synchronous `SQLite` work, so every handler moves them
//! onto the blocking pool with `tokio::task::spawn_blocking`.

pub mod logs;
pub mod service;
