//! Process-local list store
//!
//! Backs the queue when no durability is wanted, and backs the test suites.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ListStore, StoreResult};

/// In-memory [`ListStore`]; each call holds the lock for its whole duration
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with raw values, for seeding legacy data
    pub fn with_values<I, S>(key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lists = HashMap::new();
        lists.insert(
            key.to_string(),
            values.into_iter().map(Into::into).collect(),
        );
        Self {
            lists: RwLock::new(lists),
        }
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn range(&self, key: &str) -> StoreResult<Vec<String>> {
        let lists = self.lists.read().await;
        Ok(lists.get(key).cloned().unwrap_or_default())
    }

    async fn append(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut lists = self.lists.write().await;
        lists
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    async fn remove_one(&self, key: &str, value: &str) -> StoreResult<u64> {
        let mut lists = self.lists.write().await;
        let Some(list) = lists.get_mut(key) else {
            return Ok(0);
        };

        match list.iter().position(|v| v == value) {
            Some(index) => {
                list.remove(index);
                if list.is_empty() {
                    lists.remove(key);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn clear(&self, key: &str) -> StoreResult<()> {
        self.lists.write().await.remove(key);
        Ok(())
    }

    async fn len(&self, key: &str) -> StoreResult<usize> {
        let lists = self.lists.read().await;
        Ok(lists.get(key).map_or(0, Vec::len))
    }
}
