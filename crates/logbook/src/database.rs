//! Ledger database path resolution and opening.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use logbook_ledger::sqlite::{self, ConnectionConfig};
use logbook_ledger::LedgerStore;
use logbook_settings::{DatabaseSettings, LogbookSettings};
use tracing::{info, warn};

/// Pick the database file: `--db-path` (relative to the working directory)
/// or the settings path (relative to `~/.logbook`).
pub fn resolve_db_path(cli_db_path: Option<&Path>, settings: &LogbookSettings) -> Result<PathBuf> {
    match cli_db_path {
        Some(path) => std::path::absolute(path)
            .with_context(|| format!("Failed to resolve database path: {}", path.display())),
        None => Ok(logbook_settings::database_path(settings)),
    }
}

/// Create the database's parent directory if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        bail!("Database path is a directory: {}", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Open the pool, run pending migrations and build the ledger.
pub fn open_ledger(path: &Path, settings: &DatabaseSettings) -> Result<LedgerStore> {
    ensure_parent_dir(path)?;
    let path_str = path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", path.display()))?;

    let config = ConnectionConfig {
        pool_size: settings.pool_size,
        busy_timeout_ms: settings.busy_timeout_ms,
        ..ConnectionConfig::default()
    };
    let pool = sqlite::new_file(path_str, &config)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    {
        let conn = pool.get().context("Failed to get database connection")?;
        let applied = sqlite::run_migrations(&conn).context("Failed to run ledger migrations")?;
        let pragmas = sqlite::verify_pragmas(&conn).context("Failed to read database pragmas")?;
        if !pragmas.journal_mode.eq_ignore_ascii_case("wal") {
            warn!(journal_mode = %pragmas.journal_mode, "ledger database is not in WAL mode");
        }
        info!(
            path = %path.display(),
            applied,
            journal_mode = %pragmas.journal_mode,
            busy_timeout_ms = pragmas.busy_timeout_ms,
            "ledger database ready"
        );
    }
    Ok(LedgerStore::new(pool))
}
