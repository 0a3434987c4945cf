//! SQLite-backed list store
//!
//! Elements live in the `list_items` table created by
//! `karaoke_common::db::create_schema`. The autoincrement `seq` column
//! records append order; it is never reused, so order survives deletions.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{ListStore, StoreResult};

/// Durable [`ListStore`] on the service database
#[derive(Debug, Clone)]
pub struct SqliteListStore {
    pool: SqlitePool,
}

impl SqliteListStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListStore for SqliteListStore {
    async fn range(&self, key: &str) -> StoreResult<Vec<String>> {
        let values: Vec<String> =
            sqlx::query_scalar("SELECT value FROM list_items WHERE list_key = ? ORDER BY seq")
                .bind(key)
                .fetch_all(&self.pool)
                .await?;
        Ok(values)
    }

    async fn append(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO list_items (list_key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_one(&self, key: &str, value: &str) -> StoreResult<u64> {
        // Single statement: lookup and delete cannot interleave with other writers
        let result = sqlx::query(
            r#"
            DELETE FROM list_items
            WHERE seq = (
                SELECT seq FROM list_items
                WHERE list_key = ? AND value = ?
                ORDER BY seq
                LIMIT 1
            )
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear(&self, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM list_items WHERE list_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn len(&self, key: &str) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM list_items WHERE list_key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
