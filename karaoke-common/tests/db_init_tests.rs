//! Tests for database initialization and catalog queries
//!
//! Covers:
//! - Automatic database creation with default schema
//! - Idempotent reopen of an existing database
//! - Catalog ordering (artist, then title)
//! - Transactional catalog replacement

use karaoke_common::db::{
    count_catalog, init_database, init_memory_database, list_catalog, replace_catalog,
    CatalogSong, NewSong,
};
use karaoke_common::Error;
use tempfile::TempDir;

fn song(title: &str, artist: &str) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist: artist.to_string(),
        duration_seconds: 180.0,
        filename: format!("{} - {}.mp4", artist, title),
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("karaoke.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("karaoke.db");

    let pool1 = init_database(&db_path).await.unwrap();
    replace_catalog(&pool1, &[song("Shape of You", "Ed Sheeran")])
        .await
        .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    assert_eq!(count_catalog(&pool2).await.unwrap(), 1);
}

#[tokio::test]
async fn test_schema_has_list_items_table() {
    let pool = init_memory_database().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM list_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_catalog_sorted_by_artist_then_title() {
    let pool = init_memory_database().await.unwrap();

    replace_catalog(
        &pool,
        &[
            song("Zombie", "The Cranberries"),
            song("Yesterday", "Beatles"),
            song("Hey Jude", "Beatles"),
            song("Africa", "Toto"),
        ],
    )
    .await
    .unwrap();

    let catalog = list_catalog(&pool).await.unwrap();
    let pairs: Vec<(&str, &str)> = catalog
        .iter()
        .map(|s| (s.artist.as_str(), s.title.as_str()))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("Beatles", "Hey Jude"),
            ("Beatles", "Yesterday"),
            ("The Cranberries", "Zombie"),
            ("Toto", "Africa"),
        ]
    );
}

#[tokio::test]
async fn test_replace_catalog_discards_previous_rows() {
    let pool = init_memory_database().await.unwrap();

    replace_catalog(&pool, &[song("Old", "Someone"), song("Older", "Someone")])
        .await
        .unwrap();
    let inserted = replace_catalog(&pool, &[song("New", "Someone Else")])
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(
        list_catalog(&pool).await.unwrap(),
        vec![CatalogSong {
            title: "New".to_string(),
            artist: "Someone Else".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_replace_catalog_rejects_blank_rows_without_touching_table() {
    let pool = init_memory_database().await.unwrap();
    replace_catalog(&pool, &[song("Keep Me", "Artist")])
        .await
        .unwrap();

    let result = replace_catalog(&pool, &[song("Fine", "Artist"), song("   ", "Artist")]).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(count_catalog(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_empty_catalog_lists_nothing() {
    let pool = init_memory_database().await.unwrap();
    assert!(list_catalog(&pool).await.unwrap().is_empty());
}
