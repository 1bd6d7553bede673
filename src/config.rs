use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings, read from the environment (and an optional `.env`).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub user_service_url: Option<String>,
    pub user_service_timeout: Duration,
    pub db_path: PathBuf,
    pub log_filter: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = get_data_dir()?;
        Self::from_lookup(|key| std::env::var(key).ok(), &data_dir)
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        data_dir: &Path,
    ) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let user_service_timeout = match non_empty("USER_SERVICE_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().with_context(|| {
                format!("USER_SERVICE_TIMEOUT_MS must be a whole number of milliseconds, got '{raw}'")
            })?),
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        Ok(Self {
            user_service_url: non_empty("USER_SERVICE_URL"),
            user_service_timeout,
            db_path: non_empty("COSTBOOK_DB")
                .map(|p| PathBuf::from(shellexpand(&p)))
                .unwrap_or_else(|| data_dir.join("costbook.db")),
            log_filter: non_empty("COSTBOOK_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("costbook.log")
    }
}

fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "costbook", "Costbook")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
