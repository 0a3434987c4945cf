//! karaoke-ingest - rebuilds the song catalog from a video directory

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use karaoke_common::config::{default_database_path, resolve_config_path, TomlConfig};
use karaoke_common::db::init_database;
use karaoke_ingest::{collect_songs, store_songs, IngestOutcome};

/// Command-line arguments for karaoke-ingest
#[derive(Parser, Debug)]
#[command(name = "karaoke-ingest")]
#[command(about = "Replace the karaoke song catalog with the videos in a directory")]
#[command(version)]
struct Args {
    /// Directory to scan recursively
    dir: PathBuf,

    /// SQLite database to write
    #[arg(long, env = "KARAOKE_DATABASE")]
    database: Option<PathBuf>,

    /// Config file (default: KARAOKE_CONFIG, then <config dir>/karaoke/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print what would be stored without touching the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let (file_config, origin) = TomlConfig::load_or_default(config_path.as_deref());

    let default_level = file_config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting karaoke-ingest v{}", env!("CARGO_PKG_VERSION"));
    origin.log();

    info!("Scanning {}", args.dir.display());
    let songs = collect_songs(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;

    if args.dry_run {
        for song in &songs {
            println!(
                "{}\t{}\t{:.1}s\t{}",
                song.artist, song.title, song.duration_seconds, song.filename
            );
        }
        info!("Dry run: {} songs found, database not modified", songs.len());
        return Ok(());
    }

    let db_path = args
        .database
        .or(file_config.database_path)
        .unwrap_or_else(default_database_path);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let outcome = store_songs(&pool, &songs)
        .await
        .context("Failed to update song catalog")?;
    pool.close().await;

    match outcome {
        IngestOutcome::Replaced(count) => info!("Catalog replaced: {} songs", count),
        IngestOutcome::NothingFound => info!("No songs found; database unchanged"),
    }

    Ok(())
}
