#![forbid(unsafe_code)]

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::{HistoryRetention, StorageError};

mod data;
mod history;

#[cfg(test)]
pub(crate) mod test_support;

/// SQLite-backed durable store.
///
/// The pool holds a single writer connection: SQLite permits limited write
/// concurrency, and one connection makes physical write order equal arrival
/// order, which is the consistency contract the gateway relies on.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    retention: HistoryRetention,
}

impl SqliteStorage {
    /// Connects to `database_url` (e.g. `sqlite:data/dashboard.db` or
    /// `sqlite::memory:`), creating the database file and its parent
    /// directory when missing.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        if let Some(parent) = file_parent_dir(database_url) {
            std::fs::create_dir_all(parent)
                .map_err(|error| StorageError::Database(error.to_string()))?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|error| StorageError::Database(error.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;

        Ok(Self {
            pool,
            retention: HistoryRetention::default(),
        })
    }

    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            retention: HistoryRetention::default(),
        }
    }

    #[must_use]
    pub fn with_history_retention(mut self, retention: HistoryRetention) -> Self {
        self.retention = retention;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

// ---------------------------------------------------------------------------
// Migration helpers
// ---------------------------------------------------------------------------

pub async fn migrate_with_pool(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|error| StorageError::Migration(error.to_string()))?;
    Ok(())
}

fn file_parent_dir(database_url: &str) -> Option<&std::path::Path> {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    let path = path.strip_prefix("//").unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    let path = path.split('?').next().unwrap_or(path);
    std::path::Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
