//! Service-level endpoints: root info, health and metrics.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use tokio::task;

use crate::health::{self, HealthResponse};
use crate::server::AppState;

/// `GET /` response body.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: &'static str,
    /// Always `"operational"` while serving.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Available endpoints.
    pub endpoints: Vec<&'static str>,
}

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "logbook",
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        description: "Immutable workout set ledger with session grouping",
        endpoints: vec![
            "POST /api/v1/logs",
            "GET /api/v1/logs/{user_id}/{exercise_name}/latest-session",
            "GET /api/v1/logs/{user_id}/{exercise_name}/sessions",
            "GET /api/v1/logs/{user_id}/history",
            "GET /health",
            "GET /metrics",
        ],
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.clone();
    let database_ok = matches!(task::spawn_blocking(move || store.ping()).await, Ok(Ok(())));
    Json(health::health_check(state.start_time, database_ok))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
