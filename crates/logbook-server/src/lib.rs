//! # logbook-server
//!
//! Axum HTTP transport over the workout ledger.
//!
//! - `/api/v1/logs`: append sets, latest session, all sessions, history
//! - Update and delete routes that always answer `405`
//! - `/health` with a database probe, `/metrics` in Prometheus text format
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use config::{QueryLimits, ServerConfig};
pub use error::ApiError;
pub use server::{AppState, LogbookServer};
pub use shutdown::ShutdownCoordinator;
