//! Error types for the ledger subsystem.
//!
//! [`LedgerError`] is returned by every ledger operation. Validation and
//! immutability failures are caller errors; the remaining variants all mean
//! the backing store failed and are grouped by [`LedgerError::is_storage_failure`].
//!
//! "Not found" is deliberately absent: an empty query is an `Option::None` or
//! an empty `Vec`, never an error.

use thiserror::Error;

/// Field-level rejection of an append request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending input field.
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Append input was rejected; nothing was written.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An update or delete was attempted on an immutable record.
    #[error("immutable ledger: cannot {operation} log entry {record_id}")]
    ImmutabilityViolation {
        /// The refused operation (`update` or `delete`).
        operation: &'static str,
        /// The record the caller targeted.
        record_id: String,
    },

    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Internal error (e.g. poisoned lock, corrupt row).
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Whether the backing store, rather than the caller, caused the failure.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(_) | Self::Pool(_) | Self::Migration { .. } | Self::Internal(_)
        )
    }
}

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
