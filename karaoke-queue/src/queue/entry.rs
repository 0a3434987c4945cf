//! Canonical queue entry

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder for a name that is absent or unreadable
pub const UNKNOWN_NAME: &str = "(unknown)";

/// Placeholder for a song title that is absent or unreadable
pub const UNKNOWN_SONG: &str = "(unknown song)";

/// What a JavaScript writer stores when it stringifies an object by accident
pub const OBJECT_MARKER: &str = "[object Object]";

/// One song request after normalization
///
/// `id`, `name` and `song_title` are always plain strings. Any other keys the
/// stored record carried are kept in `extra`; they can never shadow the three
/// core fields because the decoder strips those keys before filling `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "songTitle")]
    pub song_title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueueEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        song_title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            song_title: song_title.into(),
            extra: Map::new(),
        }
    }

    /// Serialized form written to the store
    pub fn to_stored(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// How much of a stored value survived decoding unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryQuality {
    /// Keyed record already in canonical shape; rewriting it changes nothing
    Canonical,
    /// Keyed record that needed id synthesis or field coercion
    Repaired,
    /// Not a keyed record: raw text or a bare JSON scalar
    Fallback,
}

impl EntryQuality {
    /// Whether the stored form should be replaced by the canonical one
    pub fn needs_rewrite(self) -> bool {
        !matches!(self, EntryQuality::Canonical)
    }
}

/// Decoder output: the canonical entry plus how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry {
    pub entry: QueueEntry,
    pub quality: EntryQuality,
}
