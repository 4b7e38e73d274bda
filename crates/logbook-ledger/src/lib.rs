//! # logbook-ledger
//!
//! Immutable, append-only ledger of completed workout sets with a `SQLite`
//! backend, plus the session clustering engine that groups a user's sets
//! into workout sessions.
//!
//! - **Ledger store**: validated appends, ordered reads, no update or delete
//! - **`SQLite` backend**: `rusqlite` facade with a repository per table
//! - **Clustering**: pure time-gap grouping of newest-first records
//! - **Migrations**: version-tracked SQL schema with immutability triggers

#![deny(unsafe_code)]

pub mod clustering;
pub mod errors;
pub mod sqlite;
pub mod store;
pub mod types;
pub mod validation;

pub use clustering::{
    cluster_all_sessions, extract_latest_session, SessionMember, DEFAULT_SESSION_THRESHOLD,
};
pub use errors::{LedgerError, Result, ValidationError};
pub use sqlite::{ConnectionConfig, ConnectionPool};
pub use store::LedgerStore;
pub use types::{
    ExerciseHistory, LatestSession, LogRecord, NewLogRecord, Session, SetData, ALL_EXERCISES,
};
