//! Query bounds for session grouping and history reads.

use serde::{Deserialize, Serialize};

/// Largest threshold any configuration may allow: one year.
pub const THRESHOLD_HOURS_CEILING: f64 = 24.0 * 365.0;

/// Session clustering threshold bounds, in hours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Threshold used when a request does not give one.
    pub default_threshold_hours: f64,
    /// Smallest threshold a request may ask for.
    pub min_threshold_hours: f64,
    /// Largest threshold a request may ask for.
    pub max_threshold_hours: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_threshold_hours: 2.0,
            min_threshold_hours: 0.1,
            max_threshold_hours: 24.0,
        }
    }
}

impl SessionSettings {
    /// Whether `hours` is an acceptable request threshold.
    pub fn accepts(&self, hours: f64) -> bool {
        hours.is_finite() && hours >= self.min_threshold_hours && hours <= self.max_threshold_hours
    }
}

/// History read limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// Row limit used when a request does not give one.
    pub default_limit: u32,
    /// Largest row limit a request may ask for.
    pub max_limit: u32,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}
