//! SQLite pool setup

use anyhow::{Context, Result};
use notifyhub_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Open a pool for the configured url, creating the database file and its
/// parent directory when they do not exist yet.
pub async fn prepare_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    if let Some(parent) = sqlite_file_path(&config.url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            debug!(dir = %parent.display(), "ensuring sqlite directory");
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create sqlite directory {}", parent.display()))?;
        }
    }

    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("invalid database url {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        // HTTP handlers and the fanout job write concurrently
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database {}", config.url))?;

    info!(url = %config.url, max_connections = config.max_connections.max(1), "database pool ready");
    Ok(pool)
}

/// Filesystem path behind a `sqlite:` url, `None` for in-memory databases.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}
