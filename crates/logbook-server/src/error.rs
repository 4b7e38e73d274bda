//! HTTP error type for the ledger API.
//!
//! Error responses have the format:
//! ```json
//! { "status": "error", "message": "...", "field": "..." }
//! ```
//! `field` is present only for field-level input failures.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logbook_ledger::LedgerError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure reported by the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A path or query parameter was out of range or missing.
    #[error("{field}: {message}")]
    InvalidParameter {
        /// Parameter name.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Request could not be decoded; carries the extractor's status.
    #[error("{message}")]
    Malformed {
        /// Status chosen by the rejected extractor.
        status: StatusCode,
        /// Extractor message.
        message: String,
    },

    /// No matching data.
    #[error("{0}")]
    NotFound(String),

    /// A blocking ledger task panicked or was cancelled.
    #[error("ledger task failed: {0}")]
    TaskFailed(String),
}

impl ApiError {
    /// Shorthand for [`ApiError::InvalidParameter`].
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(LedgerError::Validation(_)) | Self::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Ledger(LedgerError::ImmutabilityViolation { .. }) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            Self::Ledger(_) | Self::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Malformed { status, .. } => *status,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Client-facing message and offending field. Storage details stay in
    /// the server log.
    fn public_message(&self) -> (String, Option<&'static str>) {
        match self {
            Self::Ledger(LedgerError::Validation(v)) => (v.to_string(), Some(v.field)),
            Self::InvalidParameter { field, message } => {
                (format!("{field} {message}"), Some(*field))
            }
            Self::Ledger(err) if err.is_storage_failure() => {
                ("internal storage error".into(), None)
            }
            Self::TaskFailed(_) => ("internal server error".into(), None),
            other => (other.to_string(), None),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let (message, field) = self.public_message();
        let body = ErrorBody {
            status: "error",
            message,
            field,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}
