//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

mod query;
mod server;

pub use query::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Root settings type for the logbook service.
///
/// Loaded from `~/.logbook/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// ```json
/// {
///   "server": { "port": 9001 },
///   "session": { "defaultThresholdHours": 1.5 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogbookSettings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Ledger database.
    pub database: DatabaseSettings,
    /// Session threshold bounds.
    pub session: SessionSettings,
    /// History limits.
    pub history: HistorySettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl LogbookSettings {
    /// Repair values that contradict each other, warning for each fix.
    ///
    /// Loading never fails on a bad combination; the service starts with
    /// the nearest consistent configuration instead.
    pub fn validate(&mut self) {
        let session = &mut self.session;
        let defaults = SessionSettings::default();
        if !session.min_threshold_hours.is_finite()
            || session.min_threshold_hours <= 0.0
            || session.min_threshold_hours > THRESHOLD_HOURS_CEILING
        {
            warn!(
                value = session.min_threshold_hours,
                "session.minThresholdHours out of range, using default"
            );
            session.min_threshold_hours = defaults.min_threshold_hours;
        }
        if !session.max_threshold_hours.is_finite()
            || session.max_threshold_hours < session.min_threshold_hours
        {
            warn!(
                value = session.max_threshold_hours,
                "session.maxThresholdHours below minimum, clamping"
            );
            session.max_threshold_hours = session.min_threshold_hours.max(defaults.max_threshold_hours);
        }
        if session.max_threshold_hours > THRESHOLD_HOURS_CEILING {
            warn!(
                value = session.max_threshold_hours,
                ceiling = THRESHOLD_HOURS_CEILING,
                "session.maxThresholdHours above ceiling, clamping"
            );
            session.max_threshold_hours = THRESHOLD_HOURS_CEILING;
        }
        if !session.accepts(session.default_threshold_hours) {
            let clamped = if session.default_threshold_hours.is_finite() {
                session
                    .default_threshold_hours
                    .clamp(session.min_threshold_hours, session.max_threshold_hours)
            } else {
                defaults
                    .default_threshold_hours
                    .clamp(session.min_threshold_hours, session.max_threshold_hours)
            };
            warn!(
                value = session.default_threshold_hours,
                clamped, "session.defaultThresholdHours out of range, clamping"
            );
            session.default_threshold_hours = clamped;
        }

        let history = &mut self.history;
        if history.max_limit == 0 {
            warn!("history.maxLimit must be at least 1, using default");
            history.max_limit = HistorySettings::default().max_limit;
        }
        if history.default_limit == 0 || history.default_limit > history.max_limit {
            let clamped = history.default_limit.clamp(1, history.max_limit);
            warn!(
                value = history.default_limit,
                clamped, "history.defaultLimit out of range, clamping"
            );
            history.default_limit = clamped;
        }

        if self.database.pool_size == 0 {
            warn!("database.poolSize must be at least 1, using 1");
            self.database.pool_size = 1;
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
