//! High-level `LedgerStore` API.
//!
//! The [`LedgerStore`] is the only entry point callers need: validated
//! appends, ordered reads and session grouping over one connection pool.

mod ledger_store;

pub use ledger_store::*;
