//! High-level `LedgerStore` API.
//!
//! Composes validation, the log entry repository and the clustering engine
//! into the operations callers use. Appends run in a single `SQLite`
//! transaction, so a record is either fully visible to later reads or absent.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::clustering::{cluster_all_sessions, extract_latest_session};
use crate::errors::{LedgerError, Result};
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::repositories::log_entry::LogEntryRepo;
use crate::sqlite::row_types::LogEntryRow;
use crate::types::{
    to_storage_precision, ExerciseHistory, LatestSession, LogRecord, NewLogRecord, Session,
    ALL_EXERCISES,
};
use crate::validation::validate;

/// Append-only ledger of completed sets over a `SQLite` connection pool.
///
/// The pool is passed in by the caller; the store owns no global state and
/// can be shared across threads behind an `Arc`.
pub struct LedgerStore {
    pool: ConnectionPool,
    write_lock: Mutex<()>,
}

impl LedgerStore {
    const SQLITE_BUSY_MAX_RETRIES: u32 = 32;

    /// Create a new `LedgerStore` with the given connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying pool, for health probes.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────

    /// Validate and durably append one set, returning the stored record.
    ///
    /// Assigns a fresh `id`, resolves a missing `timestamp` to now and stamps
    /// `created_at`. Never overwrites or merges with an existing record.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, exercise = %input.exercise_name))]
    pub fn append(&self, input: NewLogRecord) -> Result<LogRecord> {
        validate(&input)?;

        let now = to_storage_precision(Utc::now());
        let record = LogRecord {
            id: format!("log_{}", Uuid::now_v7()),
            user_id: input.user_id,
            exercise_name: input.exercise_name,
            timestamp: input.timestamp.map_or(now, to_storage_precision),
            set_number: input.set_number,
            weight_used: input.weight_used,
            reps_completed: input.reps_completed,
            duration: input.duration,
            distance: input.distance,
            rpe: input.rpe,
            created_at: now,
        };

        // Only the insert is retried; once committed, a second attempt would
        // collide with the row it already wrote.
        self.with_write_lock(|| {
            let conn = self.conn()?;
            let tx = conn.unchecked_transaction()?;
            LogEntryRepo::insert(&tx, &record)?;
            tx.commit()?;
            Ok(())
        })?;

        let stored = self.get(&record.id)?.ok_or_else(|| {
            LedgerError::Internal(format!("appended entry {} not readable", record.id))
        })?;

        debug!(id = %stored.id, set_number = stored.set_number, "log entry appended");
        Ok(stored)
    }

    /// Always fails: ledger records are immutable.
    ///
    /// The requested change is never inspected, so any payload shape is
    /// refused the same way.
    pub fn update<F>(&self, id: &str, _changes: F) -> Result<LogRecord> {
        Err(LedgerError::ImmutabilityViolation {
            operation: "update",
            record_id: id.to_string(),
        })
    }

    /// Always fails: ledger records are immutable.
    pub fn delete(&self, id: &str) -> Result<()> {
        Err(LedgerError::ImmutabilityViolation {
            operation: "delete",
            record_id: id.to_string(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Get one record by ID.
    pub fn get(&self, id: &str) -> Result<Option<LogRecord>> {
        let conn = self.conn()?;
        LogEntryRepo::get_by_id(&conn, id)?
            .map(LogRecord::try_from)
            .transpose()
    }

    /// Every record for `(user_id, exercise_name)`, newest first.
    #[instrument(skip(self))]
    pub fn query_by_user_exercise(
        &self,
        user_id: &str,
        exercise_name: &str,
    ) -> Result<Vec<LogRecord>> {
        let conn = self.conn()?;
        into_records(LogEntryRepo::list_by_user_exercise(
            &conn,
            user_id,
            exercise_name,
        )?)
    }

    /// Up to `limit` records for a user, optionally for one exercise, newest first.
    #[instrument(skip(self))]
    pub fn query_by_user(
        &self,
        user_id: &str,
        exercise_name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<LogRecord>> {
        let conn = self.conn()?;
        into_records(LogEntryRepo::list_by_user(
            &conn,
            user_id,
            exercise_name,
            limit,
        )?)
    }

    /// The most recent session for `(user_id, exercise_name)`.
    ///
    /// `None` when the pair has no records.
    #[instrument(skip(self))]
    pub fn latest_session(
        &self,
        user_id: &str,
        exercise_name: &str,
        threshold: Duration,
    ) -> Result<Option<LatestSession>> {
        let records = self.query_by_user_exercise(user_id, exercise_name)?;
        let session = extract_latest_session(records, threshold);
        let latest = LatestSession::from_records(user_id, exercise_name, &session);
        if let Some(ref found) = latest {
            debug!(total_sets = found.total_sets, "latest session resolved");
        }
        Ok(latest)
    }

    /// Every session for `(user_id, exercise_name)`, newest first.
    #[instrument(skip(self))]
    pub fn sessions(
        &self,
        user_id: &str,
        exercise_name: &str,
        threshold: Duration,
    ) -> Result<Vec<Session<LogRecord>>> {
        let records = self.query_by_user_exercise(user_id, exercise_name)?;
        Ok(cluster_all_sessions(records, threshold))
    }

    /// Raw history for a user, labelled for the transport layer.
    pub fn history(
        &self,
        user_id: &str,
        exercise_name: Option<&str>,
        limit: u32,
    ) -> Result<ExerciseHistory> {
        let entries = self.query_by_user(user_id, exercise_name, limit)?;
        Ok(ExerciseHistory {
            user_id: user_id.to_string(),
            exercise_name: exercise_name.unwrap_or(ALL_EXERCISES).to_string(),
            total_entries: entries.len(),
            entries,
        })
    }

    /// Cheap liveness probe against the database.
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn()?;
        let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────

    fn with_write_lock<T>(&self, f: impl FnMut() -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LedgerError::Internal("ledger write lock poisoned".into()))?;
        self.retry_on_sqlite_busy(f)
    }

    /// Retry only lock contention from other processes; every other error
    /// is returned on the first attempt.
    fn retry_on_sqlite_busy<T>(&self, mut f: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempts = 0;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(err)
                    if Self::is_sqlite_busy_or_locked(&err)
                        && attempts < Self::SQLITE_BUSY_MAX_RETRIES =>
                {
                    attempts += 1;
                    let base_ms = u64::from(attempts).saturating_mul(10).min(500);
                    let jitter_range = base_ms / 4;
                    let jitter = if jitter_range > 0 {
                        rand::random::<u64>() % (jitter_range * 2 + 1)
                    } else {
                        0
                    };
                    let backoff_ms = base_ms.saturating_sub(jitter_range) + jitter;
                    debug!(attempts, backoff_ms, "sqlite busy, retrying append");
                    std::thread::sleep(Duration::from_millis(backoff_ms));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_sqlite_busy_or_locked(err: &LedgerError) -> bool {
        match err {
            LedgerError::Sqlite(rusqlite::Error::SqliteFailure(code, _)) => matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

fn into_records(rows: Vec<LogEntryRow>) -> Result<Vec<LogRecord>> {
    rows.into_iter().map(LogRecord::try_from).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
