//! Stored value decoding
//!
//! Decoding runs in tiers, each total:
//! 1. keyed JSON record with the full schema (canonical)
//! 2. keyed JSON record with missing or mistyped fields (repaired)
//! 3. JSON scalar or non-JSON text, kept whole as the name (fallback)
//!
//! Nothing here returns an error. Dirty data degrades to placeholder values.

use serde_json::{Map, Value};
use tracing::debug;

use super::entry::{DecodedEntry, EntryQuality, QueueEntry, UNKNOWN_NAME, UNKNOWN_SONG};
use super::extract::{number_text, readable_text, readable_value};

const CORE_FIELDS: [&str; 3] = ["id", "name", "songTitle"];

/// Decode one stored value into a canonical entry
///
/// `index` is the value's position in the list and `clock_millis` the time of
/// the read; together they form the id of records that lack one, unique
/// within a single read.
pub fn decode_entry(raw: &str, index: usize, clock_millis: u64) -> DecodedEntry {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => decode_record(map, index, clock_millis),
        Ok(_) => {
            debug!(index, "Stored value is a bare JSON scalar, using fallback decode");
            decode_fallback(raw, index, clock_millis)
        }
        Err(_) => {
            debug!(index, "Stored value is not JSON, using fallback decode");
            decode_fallback(raw, index, clock_millis)
        }
    }
}

/// Whether a stored value carries the requested id
///
/// Keyed records compare their string-coerced `id`; records without one never
/// match. Anything that is not a keyed record compares as raw text, which is
/// how the earliest entries (a bare name) are addressed.
pub fn matches_id(raw: &str, requested: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .get("id")
            .and_then(coerce_id)
            .is_some_and(|id| id == requested),
        _ => raw == requested,
    }
}

/// String form of a stored id; null and empty strings count as absent
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        other => serde_json::to_string(other).ok(),
    }
}

/// Whether a stored value is listed under a synthesized id
///
/// True for keyed records without a usable `id` and for everything that is
/// not a keyed record.
pub fn lacks_stored_id(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map.get("id").and_then(coerce_id).is_none(),
        _ => true,
    }
}

/// Id for a record that has none
pub fn synthesize_id(clock_millis: u64, index: usize) -> String {
    format!("{}-{}", clock_millis, index)
}

/// List position encoded in a synthesized id
pub fn synthesized_index(id: &str) -> Option<usize> {
    let (clock, index) = id.split_once('-')?;
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(clock) || !all_digits(index) {
        return None;
    }
    index.parse().ok()
}

fn decode_record(map: Map<String, Value>, index: usize, clock_millis: u64) -> DecodedEntry {
    let stored_id = map.get("id").and_then(coerce_id);
    let id_is_string = matches!(map.get("id"), Some(Value::String(_)));
    let id_canonical = stored_id.is_some() && id_is_string;
    let id = stored_id.unwrap_or_else(|| synthesize_id(clock_millis, index));

    let name = readable_value(map.get("name"), UNKNOWN_NAME);
    let song_title = readable_value(map.get("songTitle"), UNKNOWN_SONG);

    let canonical = id_canonical
        && is_exact_string(map.get("name"), &name)
        && is_exact_string(map.get("songTitle"), &song_title);

    let extra = map
        .into_iter()
        .filter(|(key, _)| !CORE_FIELDS.contains(&key.as_str()))
        .collect();

    DecodedEntry {
        entry: QueueEntry {
            id,
            name,
            song_title,
            extra,
        },
        quality: if canonical {
            EntryQuality::Canonical
        } else {
            EntryQuality::Repaired
        },
    }
}

fn decode_fallback(raw: &str, index: usize, clock_millis: u64) -> DecodedEntry {
    let name = readable_text(raw).unwrap_or_else(|| UNKNOWN_NAME.to_string());

    DecodedEntry {
        entry: QueueEntry::new(synthesize_id(clock_millis, index), name, UNKNOWN_SONG),
        quality: EntryQuality::Fallback,
    }
}

fn is_exact_string(value: Option<&Value>, expected: &str) -> bool {
    matches!(value, Some(Value::String(s)) if s == expected)
}
