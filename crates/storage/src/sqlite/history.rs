use async_trait::async_trait;
use sqlx::FromRow;

use super::SqliteStorage;
use crate::{HistoryEntry, HistoryRetention, HistoryStore, StorageError};

#[derive(Debug, FromRow)]
struct HistoryRow {
    value: String,
    updated_at: String,
}

#[async_trait]
impl HistoryStore for SqliteStorage {
    async fn append_history(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO history (key, value, updated_at)
            VALUES (?1, ?2, strftime('%Y-%m-%d %H:%M:%S', 'now'))
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|error| StorageError::Database(error.to_string()))?;

        if let HistoryRetention::KeepLast(keep) = self.retention {
            sqlx::query(
                r#"
                DELETE FROM history
                WHERE key = ?1
                  AND id NOT IN (
                      SELECT id FROM history WHERE key = ?1 ORDER BY id DESC LIMIT ?2
                  )
                "#,
            )
            .bind(key)
            .bind(i64::from(keep))
            .execute(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        }

        Ok(())
    }

    async fn list_history(&self, key: &str) -> Result<Vec<HistoryEntry>, StorageError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT value, updated_at FROM history WHERE key = ?1 ORDER BY id DESC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| StorageError::Database(error.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| HistoryEntry {
                value: row.value,
                updated_at: row.updated_at,
            })
            .collect())
    }
}
