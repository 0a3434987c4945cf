//! Readable value extraction
//!
//! Past writers stored names and titles as plain strings, as nested objects,
//! and occasionally as the text of an accidentally stringified object. This
//! module turns any of those into one display string. It is pure and total.

use serde_json::{Map, Number, Value};

use super::entry::OBJECT_MARKER;

/// Longest structured dump shown before truncation, in characters
pub const DUMP_LIMIT: usize = 80;

/// Appended to a truncated dump
pub const TRUNCATION_MARKER: &str = "…";

/// Coerce a decoded value into a display string
///
/// `sentinel` is returned for absent, null, empty, and marker values.
pub fn readable_value(value: Option<&Value>, sentinel: &str) -> String {
    match value {
        None | Some(Value::Null) => sentinel.to_string(),
        Some(Value::String(text)) => readable_text(text).unwrap_or_else(|| sentinel.to_string()),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_text(n),
        Some(value @ Value::Object(map)) => {
            from_known_fields(map).unwrap_or_else(|| structured_dump(value, sentinel))
        }
        Some(value @ Value::Array(_)) => structured_dump(value, sentinel),
    }
}

/// Trimmed text, or `None` when nothing readable is left
pub fn readable_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == OBJECT_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Number text with integral floats written without a fraction (`3.0` as `3`)
pub fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// First match wins: display name, first/last, title/artist, name, title
fn from_known_fields(map: &Map<String, Value>) -> Option<String> {
    if let Some(display) = field(map, "displayName") {
        return Some(display);
    }

    match (field(map, "first"), field(map, "last")) {
        (Some(first), Some(last)) => return Some(format!("{} {}", first, last)),
        (Some(part), None) | (None, Some(part)) => return Some(part),
        (None, None) => {}
    }

    if let (Some(title), Some(artist)) = (field(map, "title"), field(map, "artist")) {
        return Some(format!("{} — {}", title, artist));
    }

    field(map, "name").or_else(|| field(map, "title"))
}

/// Readable scalar under `key`; nested structures are not searched
fn field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => readable_text(text),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

fn structured_dump(value: &Value, sentinel: &str) -> String {
    match serde_json::to_string(value) {
        Ok(text) => truncate_chars(text, DUMP_LIMIT),
        Err(_) => sentinel.to_string(),
    }
}

fn truncate_chars(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}
