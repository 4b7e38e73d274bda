//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use logbook_settings::LogbookSettings;

/// Workout logbook server.
#[derive(Parser, Debug, Default)]
#[command(name = "logbook", about = "Immutable workout set ledger server", version)]
pub struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the `SQLite` ledger database (overrides settings).
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Settings file (default `~/.logbook/settings.json`).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Log level or filter directive (overrides settings).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Settings file to load.
    pub fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(logbook_settings::settings_path)
    }

    /// Apply flag overrides on top of loaded settings.
    ///
    /// `--db-path` is resolved separately because it is relative to the
    /// working directory, not `~/.logbook`.
    pub fn apply(&self, settings: &mut LogbookSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}
