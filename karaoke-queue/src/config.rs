//! karaoke-queue specific configuration
//!
//! Command-line flags (each also readable from a `KARAOKE_*` environment
//! variable) override the config file, which overrides compiled defaults.

use clap::Parser;
use karaoke_common::config::{
    default_database_path, StoreBackend, TomlConfig, DEFAULT_BIND_ADDR, DEFAULT_PORT,
    DEFAULT_QUEUE_KEY,
};
use karaoke_common::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::queue::QueueSettings;

/// Command-line arguments for karaoke-queue
#[derive(Parser, Debug, Default)]
#[command(name = "karaoke-queue")]
#[command(about = "Karaoke song request queue service")]
#[command(version)]
pub struct Args {
    /// Config file (default: KARAOKE_CONFIG, then <config dir>/karaoke/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "KARAOKE_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "KARAOKE_PORT")]
    pub port: Option<u16>,

    /// SQLite database holding the catalog (and the queue for the sqlite store)
    #[arg(long, env = "KARAOKE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Queue store backend: sqlite or memory
    #[arg(long, env = "KARAOKE_STORE")]
    pub store: Option<StoreBackend>,

    /// Store key holding the queue
    #[arg(long, env = "KARAOKE_QUEUE_KEY")]
    pub queue_key: Option<String>,

    /// Maximum queue length (0 = unlimited)
    #[arg(long, env = "KARAOKE_CAPACITY")]
    pub capacity: Option<usize>,

    /// Rewrite legacy entries whenever the queue is listed (true/false)
    #[arg(long, env = "KARAOKE_NORMALIZE_ON_READ")]
    pub normalize_on_read: Option<bool>,
}

/// Effective service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub database_path: PathBuf,
    pub store: StoreBackend,
    pub queue: QueueSettings,
}

impl ServerConfig {
    /// Merge command-line arguments over file values over defaults
    pub fn resolve(args: &Args, file: &TomlConfig) -> Result<Self> {
        let host = args
            .bind
            .clone()
            .or_else(|| file.bind_addr.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let listen_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("invalid bind address '{}': {}", host, e)))?;

        let queue_key = args
            .queue_key
            .clone()
            .or_else(|| file.queue_key.clone())
            .unwrap_or_else(|| DEFAULT_QUEUE_KEY.to_string());
        if queue_key.trim().is_empty() {
            return Err(Error::Config("queue_key must not be empty".to_string()));
        }

        let capacity = match args.capacity {
            Some(0) => None,
            Some(n) => Some(n),
            None => file.effective_capacity(),
        };

        Ok(Self {
            listen_addr,
            database_path: args
                .database
                .clone()
                .or_else(|| file.database_path.clone())
                .unwrap_or_else(default_database_path),
            store: args.store.or(file.store).unwrap_or_default(),
            queue: QueueSettings {
                key: queue_key,
                capacity,
                normalize_on_read: args
                    .normalize_on_read
                    .or(file.normalize_on_read)
                    .unwrap_or(true),
            },
        })
    }
}
