//! Song catalog queries
//!
//! The catalog is written in bulk by the ingest tool and read by the queue
//! service. There is no per-row write path.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

/// Catalog row as served to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogSong {
    pub title: String,
    pub artist: String,
}

/// Catalog row as produced by the ingest scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub duration_seconds: f64,
    pub filename: String,
}

/// All catalog songs ordered by artist, then title
pub async fn list_catalog(pool: &SqlitePool) -> Result<Vec<CatalogSong>> {
    let songs = sqlx::query_as::<_, CatalogSong>(
        "SELECT title, artist FROM songs ORDER BY artist, title",
    )
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

/// Number of catalog rows
pub async fn count_catalog(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Replace the whole catalog in one transaction
///
/// Either every row is replaced or none is: any failure rolls back to the
/// previous catalog.
pub async fn replace_catalog(pool: &SqlitePool, songs: &[NewSong]) -> Result<usize> {
    if let Some(bad) = songs
        .iter()
        .find(|s| s.title.trim().is_empty() || s.artist.trim().is_empty())
    {
        return Err(Error::InvalidInput(format!(
            "song from '{}' has an empty title or artist",
            bad.filename
        )));
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM songs")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for song in songs {
        sqlx::query(
            "INSERT INTO songs (title, artist, duration_seconds, filename) VALUES (?, ?, ?, ?)",
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.duration_seconds)
        .bind(&song.filename)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Catalog replaced: {} songs removed, {} inserted",
        removed,
        songs.len()
    );

    Ok(songs.len())
}
