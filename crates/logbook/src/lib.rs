//! # logbook
//!
//! Startup pieces of the logbook server binary, split out of `main` so they
//! can be tested: command-line parsing and ledger database setup.

#![deny(unsafe_code)]

pub mod cli;
pub mod database;
