//! # logbook-settings
//!
//! Layered configuration for the logbook service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LogbookSettings::default()`]
//! 2. **User file**: `~/.logbook/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LOGBOOK_*` overrides (highest priority)
//!
//! There is no global instance; the binary loads settings once and passes
//! them down.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, database_path, deep_merge, load_settings, load_settings_from_path,
    logbook_home, settings_path,
};
pub use types::*;
