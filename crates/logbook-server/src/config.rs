//! Server configuration.

use std::time::Duration;

use logbook_settings::{HistorySettings, LogbookSettings, SessionSettings};
use serde::{Deserialize, Serialize};

/// Listener configuration for the logbook server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum request body size in bytes.
    pub request_body_limit: usize,
    /// Grace period for in-flight requests on shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            request_body_limit: 64 * 1024,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Listener configuration from loaded settings.
    pub fn from_settings(settings: &LogbookSettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            request_body_limit: settings.server.request_body_limit,
            shutdown_timeout: Duration::from_millis(settings.server.shutdown_timeout_ms),
        }
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bounds applied to query parameters.
#[derive(Clone, Debug, Default)]
pub struct QueryLimits {
    /// Session threshold bounds in hours.
    pub session: SessionSettings,
    /// History row limits.
    pub history: HistorySettings,
}

impl QueryLimits {
    /// Query bounds from loaded settings.
    pub fn from_settings(settings: &LogbookSettings) -> Self {
        Self {
            session: settings.session.clone(),
            history: settings.history.clone(),
        }
    }
}
