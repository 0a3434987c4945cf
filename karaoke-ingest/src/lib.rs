//! karaoke-ingest library - song catalog loader
//!
//! Scans a directory of karaoke videos and replaces the song catalog with
//! what it finds.

pub mod metadata;
pub mod scanner;

use karaoke_common::db::{replace_catalog, NewSong};
use sqlx::SqlitePool;
use std::path::Path;
use thiserror::Error;

pub use metadata::{read_song, read_tags, song_from_tags, MetadataError, TagValues, UNKNOWN_ARTIST};
pub use scanner::{ScanError, VideoScanner, VIDEO_EXTENSIONS};

/// Ingest errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Catalog(#[from] karaoke_common::Error),
}

/// What an ingest run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Catalog replaced with this many songs
    Replaced(usize),
    /// No videos found; catalog left as it was
    NothingFound,
}

/// Scan `root` and build a catalog row for every readable video found
pub fn collect_songs(root: &Path) -> Result<Vec<NewSong>, ScanError> {
    let files = VideoScanner::new().scan(root)?;
    tracing::info!("Found {} video files under {}", files.len(), root.display());

    let songs: Vec<NewSong> = files
        .iter()
        .filter_map(|path| {
            tracing::info!("Analyzing: {}", path.display());
            read_song(path)
        })
        .collect();

    let skipped = files.len() - songs.len();
    if skipped > 0 {
        tracing::warn!("Skipped {} unreadable files", skipped);
    }
    Ok(songs)
}

/// Replace the catalog with the videos under `root`
///
/// An empty scan leaves the existing catalog untouched.
pub async fn ingest_directory(
    pool: &SqlitePool,
    root: &Path,
) -> Result<IngestOutcome, IngestError> {
    let songs = collect_songs(root)?;
    store_songs(pool, &songs).await
}

/// Write scanned songs, skipping the write when there are none
pub async fn store_songs(
    pool: &SqlitePool,
    songs: &[NewSong],
) -> Result<IngestOutcome, IngestError> {
    if songs.is_empty() {
        tracing::warn!("No songs found; catalog not modified");
        return Ok(IngestOutcome::NothingFound);
    }

    let count = replace_catalog(pool, songs).await?;
    Ok(IngestOutcome::Replaced(count))
}
