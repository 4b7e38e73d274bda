//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`,
//! so every operation is a function of (connection, input) and can be tested
//! against a bare in-memory database.

pub mod log_entry;
