mod config;
mod db;
mod directory;
mod error;
mod export;
mod models;
mod report;
mod run;
mod service;
mod store;
mod ui;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use config::Config;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    let interactive = args.len() == 1;
    init_logging(&config, interactive)?;

    let db = db::Database::open(&config.db_path)?;
    let users = directory::HttpUserDirectory::new(
        config.user_service_url.as_deref(),
        config.user_service_timeout,
    )?;
    if config.user_service_url.is_none() {
        tracing::warn!("USER_SERVICE_URL is not set; adding records and reports will fail");
    }

    if interactive {
        run::as_tui(&db, &users)
    } else {
        run::as_cli(&args, &db, &users)
    }
}

/// CLI runs log to stderr. The TUI owns the terminal, so it logs to a file.
fn init_logging(config: &Config, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("Invalid COSTBOOK_LOG filter: {}", config.log_filter))?;

    if interactive {
        let path = config.log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
