//! Log entry repository.
//!
//! Entries are insert-only: there is no update or delete here, and the schema
//! triggers refuse both at the database level. Reads return rows newest
//! first, breaking timestamp ties by insertion order so the ordering is total.

use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::Result;
use crate::sqlite::row_types::LogEntryRow;
use crate::types::LogRecord;

const COLUMNS: &str = "id, user_id, exercise_name, timestamp_us, set_number, weight_used,
                       reps_completed, duration, distance, rpe, created_at_us";

/// Log entry repository. Stateless, every method takes `&Connection`.
pub struct LogEntryRepo;

impl LogEntryRepo {
    /// Insert one fully resolved record.
    pub fn insert(conn: &Connection, record: &LogRecord) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO log_entries (id, user_id, exercise_name, timestamp_us, set_number,
             weight_used, reps_completed, duration, distance, rpe, created_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id,
                record.user_id,
                record.exercise_name,
                record.timestamp.timestamp_micros(),
                record.set_number,
                record.weight_used,
                record.reps_completed,
                record.duration,
                record.distance,
                record.rpe,
                record.created_at.timestamp_micros(),
            ],
        )?;
        Ok(())
    }

    /// Get a single entry by ID.
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<LogEntryRow>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM log_entries WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Every entry for one `(user, exercise)` pair, newest first.
    pub fn list_by_user_exercise(
        conn: &Connection,
        user_id: &str,
        exercise_name: &str,
    ) -> Result<Vec<LogEntryRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM log_entries
             WHERE user_id = ?1 AND exercise_name = ?2
             ORDER BY timestamp_us DESC, seq DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id, exercise_name], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Up to `limit` entries for a user, optionally for one exercise, newest first.
    pub fn list_by_user(
        conn: &Connection,
        user_id: &str,
        exercise_name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<LogEntryRow>> {
        let rows = match exercise_name {
            Some(exercise) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM log_entries
                     WHERE user_id = ?1 AND exercise_name = ?2
                     ORDER BY timestamp_us DESC, seq DESC
                     LIMIT ?3"
                ))?;
                let rows = stmt
                    .query_map(params![user_id, exercise, limit], Self::map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM log_entries
                     WHERE user_id = ?1
                     ORDER BY timestamp_us DESC, seq DESC
                     LIMIT ?2"
                ))?;
                let rows = stmt
                    .query_map(params![user_id, limit], Self::map_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntryRow> {
        Ok(LogEntryRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            exercise_name: row.get(2)?,
            timestamp_us: row.get(3)?,
            set_number: row.get(4)?,
            weight_used: row.get(5)?,
            reps_completed: row.get(6)?,
            duration: row.get(7)?,
            distance: row.get(8)?,
            rpe: row.get(9)?,
            created_at_us: row.get(10)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;
    use chrono::{DateTime, TimeZone, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 7, hour, minute, 0).unwrap()
    }

    fn make(id: &str, user: &str, exercise: &str, ts: DateTime<Utc>, set_number: u32) -> LogRecord {
        LogRecord {
            id: id.to_string(),
            user_id: user.to_string(),
            exercise_name: exercise.to_string(),
            timestamp: ts,
            set_number,
            weight_used: 60.0,
            reps_completed: 10,
            duration: None,
            distance: None,
            rpe: None,
            created_at: ts,
        }
    }

    fn ids(rows: &[LogEntryRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn insert_and_get() {
        let conn = setup();
        let record = LogRecord {
            duration: Some(45),
            distance: Some(1.5),
            rpe: Some(7),
            ..make("log_1", "u1", "Row", at(9, 0), 1)
        };
        LogEntryRepo::insert(&conn, &record).unwrap();

        let row = LogEntryRepo::get_by_id(&conn, "log_1").unwrap().unwrap();
        assert_eq!(LogRecord::try_from(row).unwrap(), record);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = setup();
        assert!(LogEntryRepo::get_by_id(&conn, "log_nope").unwrap().is_none());
    }

    #[test]
    fn list_by_user_exercise_is_newest_first() {
        let conn = setup();
        LogEntryRepo::insert(&conn, &make("a", "u1", "Squat", at(9, 0), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("c", "u1", "Squat", at(9, 10), 3)).unwrap();
        LogEntryRepo::insert(&conn, &make("b", "u1", "Squat", at(9, 5), 2)).unwrap();

        let rows = LogEntryRepo::list_by_user_exercise(&conn, "u1", "Squat").unwrap();
        assert_eq!(ids(&rows), vec!["c", "b", "a"]);
    }

    #[test]
    fn list_by_user_exercise_matches_exactly() {
        let conn = setup();
        LogEntryRepo::insert(&conn, &make("a", "u1", "Squat", at(9, 0), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("b", "u1", "squat", at(9, 1), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("c", "u2", "Squat", at(9, 2), 1)).unwrap();

        let rows = LogEntryRepo::list_by_user_exercise(&conn, "u1", "Squat").unwrap();
        assert_eq!(ids(&rows), vec!["a"]);
    }

    #[test]
    fn list_by_user_exercise_empty() {
        let conn = setup();
        assert!(
            LogEntryRepo::list_by_user_exercise(&conn, "u1", "Squat")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn identical_timestamps_order_newest_insert_first() {
        let conn = setup();
        LogEntryRepo::insert(&conn, &make("first", "u1", "Squat", at(9, 0), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("second", "u1", "Squat", at(9, 0), 2)).unwrap();

        let rows = LogEntryRepo::list_by_user_exercise(&conn, "u1", "Squat").unwrap();
        assert_eq!(ids(&rows), vec!["second", "first"]);
    }

    #[test]
    fn list_by_user_respects_limit_and_filter() {
        let conn = setup();
        LogEntryRepo::insert(&conn, &make("a", "u1", "Squat", at(9, 0), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("b", "u1", "Bench", at(9, 5), 1)).unwrap();
        LogEntryRepo::insert(&conn, &make("c", "u1", "Squat", at(9, 10), 2)).unwrap();
        LogEntryRepo::insert(&conn, &make("d", "u2", "Squat", at(9, 15), 1)).unwrap();

        let all = LogEntryRepo::list_by_user(&conn, "u1", None, 100).unwrap();
        assert_eq!(ids(&all), vec!["c", "b", "a"]);

        let limited = LogEntryRepo::list_by_user(&conn, "u1", None, 2).unwrap();
        assert_eq!(ids(&limited), vec!["c", "b"]);

        let squats = LogEntryRepo::list_by_user(&conn, "u1", Some("Squat"), 100).unwrap();
        assert_eq!(ids(&squats), vec!["c", "a"]);
    }

    #[test]
    fn duplicate_id_fails() {
        let conn = setup();
        LogEntryRepo::insert(&conn, &make("a", "u1", "Squat", at(9, 0), 1)).unwrap();
        assert!(LogEntryRepo::insert(&conn, &make("a", "u1", "Squat", at(9, 1), 2)).is_err());
    }
}
