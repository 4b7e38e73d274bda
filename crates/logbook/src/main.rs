//! # logbook
//!
//! Workout logbook server binary: loads settings, opens the ledger and
//! serves the HTTP API until Ctrl-C.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use logbook::cli::Cli;
use logbook::database;
use logbook_server::{LogbookServer, QueryLimits, ServerConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings_path();
    let mut settings = logbook_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings: {}", settings_path.display()))?;
    cli.apply(&mut settings);

    logbook_logging::init_subscriber(&settings.logging.level, settings.logging.json);
    info!(path = %settings_path.display(), "settings loaded");

    let db_path = database::resolve_db_path(cli.db_path.as_deref(), &settings)?;
    let store = Arc::new(database::open_ledger(&db_path, &settings.database)?);

    let metrics = logbook_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let server = LogbookServer::new(
        ServerConfig::from_settings(&settings),
        store,
        QueryLimits::from_settings(&settings),
        metrics,
    );
    let (addr, handle) = server
        .listen()
        .await
        .with_context(|| format!("Failed to bind {}", server.config().bind_addr()))?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "logbook ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    let timeout = server.config().shutdown_timeout;
    if !server.shutdown().graceful_shutdown(vec![handle], timeout).await {
        warn!(?timeout, "in-flight requests abandoned at shutdown");
    }
    info!("logbook stopped");
    Ok(())
}
