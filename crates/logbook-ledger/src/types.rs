//! Typed records flowing in and out of the ledger.
//!
//! [`NewLogRecord`] is the append input; [`LogRecord`] is what the ledger
//! stores and returns. [`LatestSession`], [`Session`] and [`ExerciseHistory`]
//! are query-time shapes derived from stored records and never persisted.
//!
//! All timestamps are UTC and carried at microsecond precision, the same
//! precision the `SQLite` backend stores, so a record returned from `append`
//! compares equal to the same record read back later.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::clustering::SessionMember;

/// Label used for the history response when no exercise filter was given.
pub const ALL_EXERCISES: &str = "All Exercises";

/// Fields supplied by the caller when appending one completed set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewLogRecord {
    /// Owner of the record.
    pub user_id: String,
    /// Exact-match exercise key (case-sensitive).
    pub exercise_name: String,
    /// Logical event time. The store assigns the current time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// 1-based set number within the workout.
    pub set_number: u32,
    /// Load lifted.
    pub weight_used: f64,
    /// Repetitions completed.
    pub reps_completed: u32,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Distance covered.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Rate of perceived exertion, 1 to 10.
    #[serde(default)]
    pub rpe: Option<u8>,
}

impl NewLogRecord {
    /// Minimal record for `(user, exercise)` with the required numeric fields.
    pub fn new(
        user_id: impl Into<String>,
        exercise_name: impl Into<String>,
        set_number: u32,
        weight_used: f64,
        reps_completed: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            exercise_name: exercise_name.into(),
            timestamp: None,
            set_number,
            weight_used,
            reps_completed,
            duration: None,
            distance: None,
            rpe: None,
        }
    }

    /// Set an explicit logical event time.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the perceived exertion.
    #[must_use]
    pub fn with_rpe(mut self, rpe: u8) -> Self {
        self.rpe = Some(rpe);
        self
    }
}

/// One stored, immutable ledger entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Store-assigned unique identifier.
    #[serde(rename = "log_entry_id")]
    pub id: String,
    /// Owner of the record.
    pub user_id: String,
    /// Exact-match exercise key.
    pub exercise_name: String,
    /// Logical event time.
    pub timestamp: DateTime<Utc>,
    /// 1-based set number.
    pub set_number: u32,
    /// Load lifted.
    pub weight_used: f64,
    /// Repetitions completed.
    pub reps_completed: u32,
    /// Duration in seconds.
    pub duration: Option<u32>,
    /// Distance covered.
    pub distance: Option<f64>,
    /// Rate of perceived exertion.
    pub rpe: Option<u8>,
    /// Write time.
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    /// Project to the per-set shape used in session responses.
    pub fn to_set_data(&self) -> SetData {
        SetData {
            set_number: self.set_number,
            weight_used: self.weight_used,
            reps_completed: self.reps_completed,
            duration: self.duration,
            distance: self.distance,
            rpe: self.rpe,
            timestamp: self.timestamp,
        }
    }
}

impl SessionMember for LogRecord {
    fn logged_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn set_number(&self) -> u32 {
        self.set_number
    }
}

/// A single set inside a session response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    /// 1-based set number.
    pub set_number: u32,
    /// Load lifted.
    pub weight_used: f64,
    /// Repetitions completed.
    pub reps_completed: u32,
    /// Duration in seconds.
    pub duration: Option<u32>,
    /// Distance covered.
    pub distance: Option<f64>,
    /// Rate of perceived exertion.
    pub rpe: Option<u8>,
    /// Logical event time.
    pub timestamp: DateTime<Utc>,
}

impl SessionMember for SetData {
    fn logged_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn set_number(&self) -> u32 {
        self.set_number
    }
}

/// A temporally contiguous run of records, ordered by set number.
#[derive(Clone, Debug, PartialEq)]
pub struct Session<T> {
    /// Members in ascending `set_number` order.
    pub records: Vec<T>,
}

impl<T: SessionMember> Session<T> {
    /// Timestamp of the first set (first element in set order).
    pub fn session_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(SessionMember::logged_at)
    }

    /// Earliest logical time of any member.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(SessionMember::logged_at).min()
    }

    /// Latest logical time of any member.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(SessionMember::logged_at).max()
    }
}

impl<T> Session<T> {
    /// Number of sets in the session.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the session has no sets.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The most recent session for one `(user, exercise)` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatestSession {
    /// Owner.
    pub user_id: String,
    /// Exercise key.
    pub exercise_name: String,
    /// Time of the first set in the session.
    pub session_timestamp: DateTime<Utc>,
    /// Every set of the session, by set number.
    pub sets: Vec<SetData>,
    /// Number of sets.
    pub total_sets: usize,
}

impl LatestSession {
    /// Build from a clustered session. `None` when the session is empty.
    pub fn from_records(
        user_id: &str,
        exercise_name: &str,
        records: &[LogRecord],
    ) -> Option<Self> {
        let first = records.first()?;
        let sets: Vec<SetData> = records.iter().map(LogRecord::to_set_data).collect();
        Some(Self {
            user_id: user_id.to_string(),
            exercise_name: exercise_name.to_string(),
            session_timestamp: first.timestamp,
            total_sets: sets.len(),
            sets,
        })
    }
}

/// Raw records for a user, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
    /// Owner.
    pub user_id: String,
    /// Filter value, or [`ALL_EXERCISES`].
    pub exercise_name: String,
    /// Number of entries returned.
    pub total_entries: usize,
    /// Entries, newest first.
    pub entries: Vec<LogRecord>,
}

/// Truncate a timestamp to the microsecond precision the store keeps.
pub fn to_storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(set_number: u32, ts: DateTime<Utc>) -> LogRecord {
        LogRecord {
            id: format!("log_{set_number}"),
            user_id: "u1".into(),
            exercise_name: "Bench Press".into(),
            timestamp: ts,
            set_number,
            weight_used: 80.0,
            reps_completed: 8,
            duration: None,
            distance: None,
            rpe: Some(8),
            created_at: ts,
        }
    }

    #[test]
    fn latest_session_uses_first_set_time() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 5, 0).unwrap();
        let session =
            LatestSession::from_records("u1", "Bench Press", &[record(1, t0), record(2, t1)])
                .unwrap();
        assert_eq!(session.session_timestamp, t0);
        assert_eq!(session.total_sets, 2);
        assert_eq!(session.sets[1].set_number, 2);
    }

    #[test]
    fn latest_session_empty_is_none() {
        assert!(LatestSession::from_records("u1", "Squat", &[]).is_none());
    }

    #[test]
    fn session_bounds() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        // Set order and time order disagree on purpose.
        let session = Session {
            records: vec![record(1, t1), record(2, t0)],
        };
        assert_eq!(session.session_timestamp(), Some(t1));
        assert_eq!(session.started_at(), Some(t0));
        assert_eq!(session.ended_at(), Some(t1));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn log_record_serializes_with_entry_id() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_value(record(1, t0)).unwrap();
        assert_eq!(json["log_entry_id"], "log_1");
        assert_eq!(json["exercise_name"], "Bench Press");
        assert_eq!(json["timestamp"], "2025-03-01T10:00:00Z");
    }

    #[test]
    fn new_record_deserializes_without_optionals() {
        let input: NewLogRecord = serde_json::from_str(
            r#"{"user_id":"u1","exercise_name":"Squat","set_number":1,"weight_used":100.0,"reps_completed":5}"#,
        )
        .unwrap();
        assert!(input.timestamp.is_none());
        assert!(input.rpe.is_none());
        assert_eq!(input, NewLogRecord::new("u1", "Squat", 1, 100.0, 5));
    }

    #[test]
    fn storage_precision_drops_nanos() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = to_storage_precision(ts);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_456_000);
    }
}
