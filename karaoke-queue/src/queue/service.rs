//! Queue operations: list, submit, remove, normalize
//!
//! Every operation is a short sequence of independent store calls. The store
//! makes each call atomic; nothing here makes a sequence atomic. Known gaps:
//! - two submissions may both pass the capacity check before either appends
//! - a normalization rewrite (clear, then re-append) racing with a submission
//!   can drop it, and racing with a removal can bring the removed entry back
//! - a crash between clear and re-append loses the queue contents

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use karaoke_common::time::now_millis;
use karaoke_common::SubmissionClock;

use super::decode::{decode_entry, lacks_stored_id, matches_id, synthesized_index};
use super::entry::{DecodedEntry, QueueEntry};
use crate::store::{ListStore, StoreError};

/// Queue operation errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Submission or request fields missing or of the wrong type
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Queue already holds the configured maximum
    #[error("Queue is full ({capacity} entries)")]
    Capacity { capacity: usize },

    /// No entry carries the requested id
    #[error("Queue entry not found: {0}")]
    NotFound(String),

    /// Entry could not be serialized for the store
    #[error("Failed to encode queue entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// Store call failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Queue behavior knobs
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSettings {
    /// Store key holding the queue
    pub key: String,
    /// Maximum entries accepted; `None` disables the check
    pub capacity: Option<usize>,
    /// Rewrite non-canonical stored values whenever the queue is listed
    pub normalize_on_read: bool,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            key: karaoke_common::config::DEFAULT_QUEUE_KEY.to_string(),
            capacity: Some(karaoke_common::config::DEFAULT_CAPACITY),
            normalize_on_read: true,
        }
    }
}

/// Validated submission fields, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub song_title: String,
}

impl Submission {
    /// Validate a submission body: an object with non-blank string `name`
    /// and `songTitle`. Other keys are ignored.
    pub fn from_body(body: &Value) -> QueueResult<Self> {
        let Value::Object(map) = body else {
            return Err(QueueError::Validation(
                "body must be a JSON object with name and songTitle".to_string(),
            ));
        };

        Ok(Self {
            name: required_text(map.get("name"), "name")?,
            song_title: required_text(map.get("songTitle"), "songTitle")?,
        })
    }
}

fn required_text(value: Option<&Value>, field: &str) -> QueueResult<String> {
    match value {
        None | Some(Value::Null) => Err(QueueError::Validation(format!("{} is required", field))),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(QueueError::Validation(format!("{} must not be blank", field)))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(QueueError::Validation(format!("{} must be a string", field))),
    }
}

/// Outcome of a normalization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct NormalizeReport {
    /// Entries in the queue
    pub entries: usize,
    /// Entries whose stored form was not canonical
    pub repaired: usize,
    /// Whether the store was rewritten
    pub rewritten: bool,
}

/// Song request queue in front of an ordered list store
pub struct QueueService {
    store: Arc<dyn ListStore>,
    settings: QueueSettings,
    clock: SubmissionClock,
}

impl QueueService {
    pub fn new(store: Arc<dyn ListStore>, settings: QueueSettings) -> Self {
        Self {
            store,
            settings,
            clock: SubmissionClock::new(),
        }
    }

    /// Full queue in submission order
    ///
    /// With `normalize_on_read`, non-canonical stored values are rewritten
    /// first (best effort, see module docs). The returned entries are the
    /// same either way.
    pub async fn list(&self) -> QueueResult<Vec<QueueEntry>> {
        let decoded = self.read_decoded().await?;

        if self.settings.normalize_on_read {
            self.rewrite_if_needed(&decoded).await?;
        }

        Ok(decoded.into_iter().map(|d| d.entry).collect())
    }

    /// Explicit normalization pass, independent of `normalize_on_read`
    pub async fn normalize(&self) -> QueueResult<NormalizeReport> {
        let decoded = self.read_decoded().await?;
        let repaired = decoded.iter().filter(|d| d.quality.needs_rewrite()).count();
        let rewritten = self.rewrite_if_needed(&decoded).await?;

        Ok(NormalizeReport {
            entries: decoded.len(),
            repaired,
            rewritten,
        })
    }

    /// Validate and append a new request
    pub async fn submit(&self, body: &Value) -> QueueResult<QueueEntry> {
        let submission = Submission::from_body(body)?;

        if let Some(capacity) = self.settings.capacity {
            // Separate call from the append below; see module docs
            let len = self.store.len(&self.settings.key).await?;
            if len >= capacity {
                return Err(QueueError::Capacity { capacity });
            }
        }

        let entry = QueueEntry::new(
            self.clock.next_millis().to_string(),
            submission.name,
            submission.song_title,
        );
        let stored = entry.to_stored()?;
        self.store.append(&self.settings.key, &stored).await?;

        info!(id = %entry.id, name = %entry.name, song = %entry.song_title, "Request queued");
        Ok(entry)
    }

    /// Remove the first entry carrying `id`
    ///
    /// Resolves the id to the exact stored value with a full scan, then asks
    /// the store to remove one occurrence of that value. If the value vanished
    /// in between, the result is `NotFound`.
    ///
    /// Entries stored without an id are listed under a `<clock>-<index>` id.
    /// When no stored id matches, such an id resolves to the element at that
    /// position, provided it still has no id of its own.
    pub async fn remove(&self, id: &str) -> QueueResult<()> {
        if id.trim().is_empty() {
            return Err(QueueError::Validation("id is required".to_string()));
        }

        let mut raw_values = self.store.range(&self.settings.key).await?;
        let position = raw_values
            .iter()
            .position(|raw| matches_id(raw, id))
            .or_else(|| {
                synthesized_index(id).filter(|&index| {
                    raw_values.get(index).is_some_and(|raw| lacks_stored_id(raw))
                })
            });
        let Some(position) = position else {
            return Err(QueueError::NotFound(id.to_string()));
        };
        let raw = raw_values.swap_remove(position);

        let removed = self.store.remove_one(&self.settings.key, &raw).await?;
        match removed {
            1 => {
                info!(id, "Request removed");
                Ok(())
            }
            0 => {
                warn!(id, "Entry disappeared between scan and removal");
                Err(QueueError::NotFound(id.to_string()))
            }
            n => {
                // Store contract allows at most one
                warn!(id, removed = n, "Store removed more than one element");
                Ok(())
            }
        }
    }

    async fn read_decoded(&self) -> QueueResult<Vec<DecodedEntry>> {
        let raw_values = self.store.range(&self.settings.key).await?;
        let clock = now_millis();

        Ok(raw_values
            .iter()
            .enumerate()
            .map(|(index, raw)| decode_entry(raw, index, clock))
            .collect())
    }

    /// Replace the stored list with canonical forms, in the same order
    async fn rewrite_if_needed(&self, decoded: &[DecodedEntry]) -> QueueResult<bool> {
        let repaired = decoded.iter().filter(|d| d.quality.needs_rewrite()).count();
        if repaired == 0 {
            debug!(entries = decoded.len(), "Queue already canonical");
            return Ok(false);
        }

        // Encode everything before clearing so an encode failure loses nothing
        let stored = decoded
            .iter()
            .map(|d| d.entry.to_stored())
            .collect::<Result<Vec<_>, _>>()?;

        self.store.clear(&self.settings.key).await?;
        for value in &stored {
            self.store.append(&self.settings.key, value).await?;
        }

        info!(
            entries = stored.len(),
            repaired, "Queue rewritten in canonical form"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::entry::{UNKNOWN_NAME, UNKNOWN_SONG};
    use crate::store::MemoryListStore;
    use serde_json::json;

    const KEY: &str = "karaoke_queue";

    fn settings(capacity: Option<usize>, normalize_on_read: bool) -> QueueSettings {
        QueueSettings {
            key: KEY.to_string(),
            capacity,
            normalize_on_read,
        }
    }

    fn service_with(store: Arc<MemoryListStore>, settings: QueueSettings) -> QueueService {
        QueueService::new(store, settings)
    }

    fn request(name: &str, song: &str) -> Value {
        json!({"name": name, "songTitle": song})
    }

    #[tokio::test]
    async fn test_submit_then_list_returns_same_entry() {
        let store = Arc::new(MemoryListStore::new());
        let service = service_with(store, settings(None, true));

        let created = service.submit(&request("Ced", "Shape of You")).await.unwrap();
        let listed = service.list().await.unwrap();

        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(created.name, "Ced");
        assert_eq!(created.song_title, "Shape of You");
        assert!(created.id.parse::<u64>().is_ok());
    }

    #[tokio::test]
    async fn test_submit_trims_fields() {
        let service = service_with(Arc::new(MemoryListStore::new()), settings(None, true));

        let created = service.submit(&request("  Ced ", "\tHalo\n")).await.unwrap();

        assert_eq!(created.name, "Ced");
        assert_eq!(created.song_title, "Halo");
    }

    #[tokio::test]
    async fn test_submit_ids_strictly_increase() {
        let service = service_with(Arc::new(MemoryListStore::new()), settings(None, true));

        let mut previous = 0u64;
        for i in 0..20 {
            let entry = service.submit(&request("n", &format!("s{}", i))).await.unwrap();
            let id: u64 = entry.id.parse().unwrap();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_submission_validation() {
        let cases = [
            json!({}),
            json!({"name": "Ced"}),
            json!({"songTitle": "Halo"}),
            json!({"name": "  ", "songTitle": "Halo"}),
            json!({"name": "Ced", "songTitle": ""}),
            json!({"name": 5, "songTitle": "Halo"}),
            json!({"name": "Ced", "songTitle": {"title": "Halo"}}),
            json!({"name": null, "songTitle": "Halo"}),
            json!("Ced"),
            json!(["Ced", "Halo"]),
        ];

        for body in cases {
            assert!(
                matches!(Submission::from_body(&body), Err(QueueError::Validation(_))),
                "body should be rejected: {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_capacity_rejects_without_appending() {
        let store = Arc::new(MemoryListStore::new());
        let service = service_with(store.clone(), settings(Some(2), true));

        service.submit(&request("a", "1")).await.unwrap();
        service.submit(&request("b", "2")).await.unwrap();
        let result = service.submit(&request("c", "3")).await;

        assert!(matches!(result, Err(QueueError::Capacity { capacity: 2 })));
        assert_eq!(store.len(KEY).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_submission_not_appended() {
        let store = Arc::new(MemoryListStore::new());
        let service = service_with(store.clone(), settings(None, true));

        assert!(service.submit(&json!({"name": "Ced"})).await.is_err());
        assert_eq!(store.len(KEY).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_once_then_not_found() {
        let service = service_with(Arc::new(MemoryListStore::new()), settings(None, true));
        let entry = service.submit(&request("Ced", "Halo")).await.unwrap();

        service.remove(&entry.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());

        let again = service.remove(&entry.id).await;
        assert!(matches!(again, Err(QueueError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_blank_id_is_validation_error() {
        let service = service_with(Arc::new(MemoryListStore::new()), settings(None, true));
        assert!(matches!(service.remove(" ").await, Err(QueueError::Validation(_))));
    }

    #[tokio::test]
    async fn test_remove_duplicate_ids_first_match_only() {
        let dup = r#"{"id":"7","name":"A","songTitle":"X"}"#;
        let other = r#"{"id":"7","name":"B","songTitle":"Y"}"#;
        let store = Arc::new(MemoryListStore::with_values(KEY, [dup, other, dup]));
        let service = service_with(store.clone(), settings(None, false));

        service.remove("7").await.unwrap();

        assert_eq!(store.range(KEY).await.unwrap(), vec![other, dup]);
    }

    #[tokio::test]
    async fn test_remove_matches_numeric_and_raw_ids() {
        let store = Arc::new(MemoryListStore::with_values(
            KEY,
            [r#"{"id":123,"name":"A","songTitle":"X"}"#, "David Test"],
        ));
        let service = service_with(store.clone(), settings(None, false));

        service.remove("123").await.unwrap();
        service.remove("David Test").await.unwrap();

        assert!(store.range(KEY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_rewrites_legacy_values_in_order() {
        let store = Arc::new(MemoryListStore::with_values(
            KEY,
            [
                r#"{"id":"1","name":"First","songTitle":"One"}"#,
                "Legacy Singer",
                r#"{"id":3,"name":"Third"}"#,
            ],
        ));
        let service = service_with(store.clone(), settings(None, true));

        let listed = service.list().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Legacy Singer", "Third"]);
        assert_eq!(listed[1].song_title, UNKNOWN_SONG);
        assert_eq!(listed[2].id, "3");

        // Store now holds canonical forms, so ids are stable across reads
        let stored = store.range(KEY).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(service.list().await.unwrap(), listed);

        // The synthesized id of the legacy entry is now deletable
        service.remove(&listed[1].id).await.unwrap();
        let remaining: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(remaining, vec!["First", "Third"]);
    }

    #[tokio::test]
    async fn test_list_without_normalize_leaves_store_alone() {
        let store = Arc::new(MemoryListStore::with_values(KEY, ["", "raw"]));
        let service = service_with(store.clone(), settings(None, false));

        let listed = service.list().await.unwrap();

        assert_eq!(listed[0].name, UNKNOWN_NAME);
        assert_eq!(listed[1].name, "raw");
        assert_eq!(store.range(KEY).await.unwrap(), vec!["", "raw"]);
    }

    #[tokio::test]
    async fn test_canonical_queue_not_rewritten() {
        let canonical = r#"{"id":"1","name":"A","songTitle":"B"}"#;
        let store = Arc::new(MemoryListStore::with_values(KEY, [canonical]));
        let service = service_with(store.clone(), settings(None, true));

        let report = service.normalize().await.unwrap();

        assert_eq!(
            report,
            NormalizeReport {
                entries: 1,
                repaired: 0,
                rewritten: false
            }
        );
        // Byte-identical: nothing was re-serialized
        assert_eq!(store.range(KEY).await.unwrap(), vec![canonical]);
    }

    #[tokio::test]
    async fn test_explicit_normalize_reports_repairs() {
        let store = Arc::new(MemoryListStore::with_values(
            KEY,
            [r#"{"id":"1","name":"A","songTitle":"B"}"#, "raw", "42"],
        ));
        let service = service_with(store.clone(), settings(None, false));

        let report = service.normalize().await.unwrap();
        assert_eq!(report.entries, 3);
        assert_eq!(report.repaired, 2);
        assert!(report.rewritten);

        let second = service.normalize().await.unwrap();
        assert_eq!(second.repaired, 0);
        assert!(!second.rewritten);
    }

    #[tokio::test]
    async fn test_order_preserved_across_mid_sequence_rewrite() {
        let store = Arc::new(MemoryListStore::with_values(KEY, ["legacy"]));
        let service = service_with(store, settings(None, true));

        let e1 = service.submit(&request("E1", "s")).await.unwrap();
        service.list().await.unwrap();
        let e2 = service.submit(&request("E2", "s")).await.unwrap();
        let e3 = service.submit(&request("E3", "s")).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].name, "legacy");
        assert_eq!(&listed[1..], &[e1, e2, e3]);
    }

    /// Reads like a memory store but never confirms a removal
    struct VanishingStore(MemoryListStore);

    #[async_trait::async_trait]
    impl ListStore for VanishingStore {
        async fn range(&self, key: &str) -> crate::store::StoreResult<Vec<String>> {
            self.0.range(key).await
        }
        async fn append(&self, key: &str, value: &str) -> crate::store::StoreResult<()> {
            self.0.append(key, value).await
        }
        async fn remove_one(&self, _key: &str, _value: &str) -> crate::store::StoreResult<u64> {
            Ok(0)
        }
        async fn clear(&self, key: &str) -> crate::store::StoreResult<()> {
            self.0.clear(key).await
        }
    }

    #[tokio::test]
    async fn test_remove_vanished_between_scan_and_removal_is_not_found() {
        let store = VanishingStore(MemoryListStore::with_values(
            KEY,
            [r#"{"id":"1","name":"A","songTitle":"B"}"#],
        ));
        let service = QueueService::new(Arc::new(store), settings(None, false));

        let result = service.remove("1").await;

        assert!(matches!(result, Err(QueueError::NotFound(ref id)) if id == "1"));
    }

    #[tokio::test]
    async fn test_remove_listed_synthesized_id_without_normalizing() {
        let keyed = r#"{"id":"1","name":"Keep","songTitle":"X"}"#;
        let idless = r#"{"name":"A","songTitle":"B"}"#;
        let store = Arc::new(MemoryListStore::with_values(KEY, [keyed, idless, "Legacy"]));
        let service = service_with(store.clone(), settings(None, false));

        let listed = service.list().await.unwrap();
        assert_eq!(listed[1].name, "A");

        service.remove(&listed[1].id).await.unwrap();
        assert_eq!(store.range(KEY).await.unwrap(), vec![keyed, "Legacy"]);

        // Positions shift after a removal; the legacy value is now at index 1
        let listed = service.list().await.unwrap();
        service.remove(&listed[1].id).await.unwrap();
        assert_eq!(store.range(KEY).await.unwrap(), vec![keyed]);
    }

    #[tokio::test]
    async fn test_synthesized_id_never_removes_entry_with_own_id() {
        let keyed = r#"{"id":"1","name":"Keep","songTitle":"X"}"#;
        let store = Arc::new(MemoryListStore::with_values(KEY, [keyed]));
        let service = service_with(store.clone(), settings(None, false));

        let result = service.remove("1700000000000-0").await;

        assert!(matches!(result, Err(QueueError::NotFound(_))));
        assert_eq!(store.range(KEY).await.unwrap(), vec![keyed]);
    }

    #[tokio::test]
    async fn test_float_id_removed_by_integer_text() {
        let store = Arc::new(MemoryListStore::with_values(
            KEY,
            [r#"{"id":1700000000000.0,"name":"A","songTitle":"B"}"#],
        ));
        let service = service_with(store.clone(), settings(None, false));

        assert_eq!(service.list().await.unwrap()[0].id, "1700000000000");
        service.remove("1700000000000").await.unwrap();

        assert!(store.range(KEY).await.unwrap().is_empty());
    }
}
