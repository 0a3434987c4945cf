//! Ordered list store
//!
//! The queue lives in an external list addressed by key. Elements are opaque
//! strings, appended at the tail and read head to tail. There is no
//! positional addressing: removal is by exact value.
//!
//! Each call is atomic on its own. Sequences of calls (read then clear then
//! re-append, or length check then append) are not, and callers must not
//! assume otherwise.

use async_trait::async_trait;
use thiserror::Error;

mod memory;
mod sqlite;

pub use memory::MemoryListStore;
pub use sqlite::SqliteListStore;

/// Store communication failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database backend error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Backend unreachable or refused the call
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-addressed ordered list of strings
#[async_trait]
pub trait ListStore: Send + Sync {
    /// All elements of `key`, head to tail. Missing keys read as empty.
    async fn range(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Push `value` at the tail of `key`
    async fn append(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove the head-most element equal to `value`
    ///
    /// Returns the number of elements removed: 0 or 1, never more, even when
    /// duplicates exist.
    async fn remove_one(&self, key: &str, value: &str) -> StoreResult<u64>;

    /// Remove every element of `key`
    async fn clear(&self, key: &str) -> StoreResult<()>;

    /// Number of elements in `key`
    async fn len(&self, key: &str) -> StoreResult<usize> {
        Ok(self.range(key).await?.len())
    }
}
