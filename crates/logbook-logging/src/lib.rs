//! # logbook-logging
//!
//! `tracing` subscriber setup for the logbook binaries.
//!
//! `RUST_LOG` always wins over the configured level, so operators can
//! raise verbosity for one crate without editing settings.

#![deny(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Level used when the configured directive does not parse.
const FALLBACK_LEVEL: &str = "info";

/// Build the filter for a configured level, ignoring `RUST_LOG`.
///
/// Accepts full directive syntax (`warn,logbook_ledger=debug`). An
/// unparseable directive falls back to `info`.
pub fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Later calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default filter directive when `RUST_LOG` is unset.
/// * `json` - Emit one JSON object per line instead of compact text.
pub fn init_subscriber(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails only when a global subscriber already exists
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
