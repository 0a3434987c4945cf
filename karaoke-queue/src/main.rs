//! karaoke-queue - song request queue service
//!
//! Serves the request queue and the song catalog over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use karaoke_common::config::{resolve_config_path, StoreBackend, TomlConfig};
use karaoke_common::db::init_database;
use karaoke_queue::config::{Args, ServerConfig};
use karaoke_queue::store::{ListStore, MemoryListStore, SqliteListStore};
use karaoke_queue::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let (file_config, origin) = TomlConfig::load_or_default(config_path.as_deref());

    // RUST_LOG wins over the config file's log_level
    let default_level = file_config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    info!("Starting karaoke-queue v{}", env!("CARGO_PKG_VERSION"));
    origin.log();

    let config = ServerConfig::resolve(&args, &file_config).context("Invalid configuration")?;

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let store: Arc<dyn ListStore> = match config.store {
        StoreBackend::Sqlite => Arc::new(SqliteListStore::new(pool.clone())),
        StoreBackend::Memory => Arc::new(MemoryListStore::new()),
    };
    info!(
        "Queue store: {} (key '{}', capacity {})",
        config.store,
        config.queue.key,
        config
            .queue
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    let state = AppState::new(pool, store, config.queue.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("karaoke-queue listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
