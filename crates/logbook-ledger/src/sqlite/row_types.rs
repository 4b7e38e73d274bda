//! Raw `log_entries` row shape.
//!
//! Conversion to the public [`LogRecord`] happens here, in one place, so the
//! repository never hands microsecond integers to callers.

use chrono::{DateTime, Utc};

use crate::errors::{LedgerError, Result};
use crate::types::LogRecord;

/// Raw row from the `log_entries` table.
#[derive(Clone, Debug)]
pub struct LogEntryRow {
    /// Record ID.
    pub id: String,
    /// Owner.
    pub user_id: String,
    /// Exercise key.
    pub exercise_name: String,
    /// Logical time, microseconds since the epoch.
    pub timestamp_us: i64,
    /// Set number.
    pub set_number: u32,
    /// Load lifted.
    pub weight_used: f64,
    /// Repetitions.
    pub reps_completed: u32,
    /// Duration in seconds.
    pub duration: Option<u32>,
    /// Distance.
    pub distance: Option<f64>,
    /// Perceived exertion.
    pub rpe: Option<u8>,
    /// Write time, microseconds since the epoch.
    pub created_at_us: i64,
}

impl TryFrom<LogEntryRow> for LogRecord {
    type Error = LedgerError;

    fn try_from(row: LogEntryRow) -> Result<Self> {
        Ok(Self {
            timestamp: from_micros(row.timestamp_us, &row.id)?,
            created_at: from_micros(row.created_at_us, &row.id)?,
            id: row.id,
            user_id: row.user_id,
            exercise_name: row.exercise_name,
            set_number: row.set_number,
            weight_used: row.weight_used,
            reps_completed: row.reps_completed,
            duration: row.duration,
            distance: row.distance,
            rpe: row.rpe,
        })
    }
}

fn from_micros(us: i64, id: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(us)
        .ok_or_else(|| LedgerError::Internal(format!("timestamp out of range on {id}: {us}")))
}
