//! Song metadata from video container tags
//!
//! Tags are read with lofty. Containers lofty has no tag support for (mkv,
//! avi) and files without tags still produce a catalog row built from
//! defaults. Empty files, and files lofty recognises but fails to parse, are
//! skipped.

use karaoke_common::db::NewSong;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::path::Path;
use thiserror::Error;

/// Artist recorded when no artist or composer tag is present
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Zero-byte file
    #[error("File is empty")]
    Empty,

    /// lofty recognised the container but could not parse it
    #[error("Failed to read tags: {0}")]
    ReadError(String),

    /// I/O error (file metadata)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw tag values of interest, before defaults are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagValues {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub composer: Option<String>,
    pub duration_seconds: Option<f64>,
}

/// Read title, artist, composer, and duration from a file
///
/// Containers without lofty support yield empty values rather than an error.
pub fn read_tags(path: &Path) -> Result<TagValues, MetadataError> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(MetadataError::Empty);
    }

    let detected = Probe::open(path).map_err(|e| MetadataError::ReadError(e.to_string()))?;
    if detected.file_type().is_none() {
        tracing::debug!(file = %path.display(), "No tag support for container, using defaults");
        return Ok(TagValues::default());
    }

    let tagged_file = detected
        .read()
        .map_err(|e| MetadataError::ReadError(e.to_string()))?;

    let duration = tagged_file.properties().duration().as_secs_f64();

    let mut values = TagValues {
        duration_seconds: (duration > 0.0).then_some(duration),
        ..Default::default()
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        values.title = tag.title().map(|s| s.to_string());
        values.artist = tag.artist().map(|s| s.to_string());
        values.composer = tag.get_string(&ItemKey::Composer).map(str::to_string);
    }

    Ok(values)
}

/// Catalog row for `path`, or `None` when the file cannot be read
pub fn read_song(path: &Path) -> Option<NewSong> {
    let tags = match read_tags(path) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable file");
            return None;
        }
    };

    let song = song_from_tags(path, &tags);
    tracing::debug!(
        file = %song.filename,
        title = %song.title,
        artist = %song.artist,
        duration_s = song.duration_seconds,
        "Extracted metadata"
    );
    Some(song)
}

/// Apply catalog defaults to raw tag values
///
/// - title: tag, else the file stem
/// - artist: tag, else composer, else [`UNKNOWN_ARTIST`]
/// - duration: tag, else 0
///
/// NUL characters are stripped before a value is considered present.
pub fn song_from_tags(path: &Path, tags: &TagValues) -> NewSong {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| file_name.clone());

    let title = clean(tags.title.as_deref()).unwrap_or_else(|| stem.replace('\0', ""));
    let artist = clean(tags.artist.as_deref())
        .or_else(|| clean(tags.composer.as_deref()))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    NewSong {
        title,
        artist,
        duration_seconds: tags
            .duration_seconds
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0),
        filename: file_name,
    }
}

/// NUL-free, trimmed, non-empty text
fn clean(value: Option<&str>) -> Option<String> {
    let cleaned = value?.replace('\0', "");
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
