//! `LogbookServer`: Axum HTTP server over the ledger.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use logbook_ledger::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{QueryLimits, ServerConfig};
use crate::handlers::{logs, service};
use crate::metrics::track_requests;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger.
    pub store: Arc<LedgerStore>,
    /// Query parameter bounds.
    pub limits: Arc<QueryLimits>,
    /// Renders `/metrics`.
    pub metrics: PrometheusHandle,
    /// When the server started.
    pub start_time: Instant,
}

/// The logbook HTTP server.
pub struct LogbookServer {
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl LogbookServer {
    /// Create a new server over `store`.
    pub fn new(
        config: ServerConfig,
        store: Arc<LedgerStore>,
        limits: QueryLimits,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            state: AppState {
                store,
                limits: Arc::new(limits),
                metrics,
                start_time: Instant::now(),
            },
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(service::service_info))
            .route("/health", get(service::health))
            .route("/metrics", get(service::metrics))
            .route("/api/v1/logs", post(logs::append_log))
            // Same segment name as the user routes below; here it holds a log entry id.
            .route(
                "/api/v1/logs/{user_id}",
                put(logs::update_log)
                    .patch(logs::update_log)
                    .delete(logs::delete_log),
            )
            .route("/api/v1/logs/{user_id}/history", get(logs::history))
            .route(
                "/api/v1/logs/{user_id}/{exercise_name}/latest-session",
                get(logs::latest_session),
            )
            .route(
                "/api/v1/logs/{user_id}/{exercise_name}/sessions",
                get(logs::sessions),
            )
            .route_layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(self.config.request_body_limit))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown is signalled.
    ///
    /// Returns the bound address (useful with port `0`) and the serving task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let stop = self.shutdown.token().cancelled_owned();

        info!(%addr, "logbook server listening");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(stop).await {
                error!(error = %e, "server terminated with error");
            }
            info!("logbook server stopped");
        });
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the ledger.
    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.state.store
    }
}
