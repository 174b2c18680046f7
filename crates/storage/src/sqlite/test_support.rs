use super::{migrate_with_pool, SqliteStorage};
use crate::HistoryRetention;

pub(crate) async fn memory_storage() -> SqliteStorage {
    let storage = SqliteStorage::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    migrate_with_pool(storage.pool()).await.expect("migrate");
    storage
}

pub(crate) async fn memory_storage_with_retention(retention: HistoryRetention) -> SqliteStorage {
    memory_storage().await.with_history_retention(retention)
}
