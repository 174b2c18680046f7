#![forbid(unsafe_code)]

use async_trait::async_trait;

pub mod sqlite;

pub use sqlite::SqliteStorage;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("migration error: {0}")]
    Migration(String),
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// One row of a key's change log, as returned by `list_history` (newest
/// first). Timestamps are server-assigned `%Y-%m-%d %H:%M:%S` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub value: String,
    pub updated_at: String,
}

/// How much change log to keep per key. Applied after every append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRetention {
    /// Keep everything. Matches the original behavior; growth is unbounded.
    #[default]
    Unbounded,
    /// Keep only the newest `n` entries for each key.
    KeepLast(u32),
}

// ---------------------------------------------------------------------------
// Domain-specific storage traits
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn ping(&self) -> Result<(), StorageError>;
    /// Latest value of `key`; `None` when no row exists. The empty string is
    /// a stored value, not absence.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Creates or overwrites the row, refreshing `updated_at`. Atomic per
    /// key; last write wins by arrival order at the store.
    async fn upsert(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Idempotent; deleting an absent key succeeds silently.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Always inserts a new row; never updates an existing one.
    async fn append_history(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Full log for `key`, newest first. Read-only and restartable; no
    /// server-side cursor state.
    async fn list_history(&self, key: &str) -> Result<Vec<HistoryEntry>, StorageError>;
}

/// Unified supertrait for code that needs both storage domains.
pub trait Store: DataStore + HistoryStore {}

impl<T> Store for T where T: DataStore + HistoryStore {}
