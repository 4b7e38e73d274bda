//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// `"ok"` when the ledger database answered a probe, else `"unavailable"`.
    pub database: String,
}

/// Build a health response from the start time and a database probe result.
pub fn health_check(start_time: Instant, database_ok: bool) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        database: if database_ok { "ok" } else { "unavailable" }.into(),
    }
}
