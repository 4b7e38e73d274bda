//! Temporal session clustering.
//!
//! A session is a maximal run of records, walked newest to oldest, in which
//! every consecutive gap is at most the threshold. The comparison is
//! inclusive: a gap exactly equal to the threshold stays in the session.
//!
//! Both entry points take records newest-first and are pure: no I/O, no
//! shared state. Set numbers never influence membership, they only order the
//! output, and the sort is stable so duplicate set numbers keep their input
//! order.
//!
//! [`extract_latest_session`] stops pulling from its input at the first
//! boundary, so a lazily streamed history is only read as far as needed.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::Session;

/// Gap used when the caller does not choose one.
pub const DEFAULT_SESSION_THRESHOLD: Duration = Duration::from_secs(2 * 60 * 60);

/// Anything that can be clustered into sessions.
pub trait SessionMember {
    /// Logical event time.
    fn logged_at(&self) -> DateTime<Utc>;
    /// Position within the workout; used for output ordering only.
    fn set_number(&self) -> u32;
}

/// Return the most recent session, ordered by ascending set number.
///
/// Empty input yields an empty session.
pub fn extract_latest_session<T, I>(records: I, threshold: Duration) -> Vec<T>
where
    T: SessionMember,
    I: IntoIterator<Item = T>,
{
    let max_gap = max_gap(threshold);
    let mut iter = records.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut prev_at = first.logged_at();
    let mut session = vec![first];
    for record in iter {
        let at = record.logged_at();
        if prev_at - at > max_gap {
            break;
        }
        prev_at = at;
        session.push(record);
    }

    order_by_set_number(&mut session);
    session
}

/// Partition the whole history into sessions, newest session first.
pub fn cluster_all_sessions<T, I>(records: I, threshold: Duration) -> Vec<Session<T>>
where
    T: SessionMember,
    I: IntoIterator<Item = T>,
{
    let max_gap = max_gap(threshold);
    let mut sessions = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut prev_at: Option<DateTime<Utc>> = None;

    for record in records {
        let at = record.logged_at();
        if prev_at.is_some_and(|prev| prev - at > max_gap) {
            sessions.push(seal(std::mem::take(&mut current)));
        }
        prev_at = Some(at);
        current.push(record);
    }
    if !current.is_empty() {
        sessions.push(seal(current));
    }
    sessions
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal
// ─────────────────────────────────────────────────────────────────────────────

/// Thresholds beyond `TimeDelta`'s range collapse everything into one session.
fn max_gap(threshold: Duration) -> TimeDelta {
    TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX)
}

fn seal<T: SessionMember>(mut records: Vec<T>) -> Session<T> {
    order_by_set_number(&mut records);
    Session { records }
}

fn order_by_set_number<T: SessionMember>(records: &mut [T]) {
    records.sort_by_key(SessionMember::set_number);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
