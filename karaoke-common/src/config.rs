//! Configuration loading and path resolution
//!
//! Every service reads the same optional TOML file. Missing files and missing
//! keys are never fatal: the service logs a warning and runs on defaults,
//! with command-line flags layered on top by each binary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "KARAOKE_CONFIG";

/// Store key of the request queue
pub const DEFAULT_QUEUE_KEY: &str = "karaoke_queue";

/// Maximum queue length enforced at submission
pub const DEFAULT_CAPACITY: usize = 100;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;

/// Backend holding the ordered request list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Durable list in the service database
    #[default]
    Sqlite,
    /// Process-local list, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown store backend '{}' (expected 'sqlite' or 'memory')",
                other
            )),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub store: Option<StoreBackend>,
    pub queue_key: Option<String>,
    /// `0` disables the capacity check
    pub capacity: Option<usize>,
    pub normalize_on_read: Option<bool>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse configuration text
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Load a configuration file, falling back to defaults on any failure
    ///
    /// Returns where the values came from instead of logging, so binaries can
    /// read `log_level` before the subscriber exists and report afterwards.
    pub fn load_or_default(path: Option<&Path>) -> (Self, ConfigOrigin) {
        let Some(path) = path else {
            return (Self::default(), ConfigOrigin::Defaults);
        };

        match Self::load(path) {
            Ok(config) => (config, ConfigOrigin::File(path.to_path_buf())),
            Err(e) => (
                Self::default(),
                ConfigOrigin::Ignored {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            ),
        }
    }

    /// Capacity with the `0 = unlimited` convention applied
    pub fn effective_capacity(&self) -> Option<usize> {
        match self.capacity {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_CAPACITY),
        }
    }
}

/// Where the effective file configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// No config file was found
    Defaults,
    /// Values read from this file
    File(PathBuf),
    /// File present but unusable; defaults applied
    Ignored { path: PathBuf, reason: String },
}

impl ConfigOrigin {
    /// Report the origin; an ignored file is a warning, never fatal
    pub fn log(&self) {
        match self {
            ConfigOrigin::Defaults => info!("No config file found, using defaults"),
            ConfigOrigin::File(path) => info!("Loaded config file: {}", path.display()),
            ConfigOrigin::Ignored { path, reason } => {
                warn!("Ignoring config file {}: {}", path.display(), reason)
            }
        }
    }
}

/// Resolve which config file to read, following priority order:
/// 1. Command-line argument (highest priority)
/// 2. `KARAOKE_CONFIG` environment variable
/// 3. Platform config directory (`<config dir>/karaoke/config.toml`), if it exists
///
/// Explicit paths (1 and 2) are returned even when the file is missing so the
/// caller can warn about them.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_file().filter(|path| path.exists())
}

/// Platform default config file location
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("karaoke").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("karaoke"))
        .unwrap_or_else(|| PathBuf::from("./karaoke_data"))
        .join("karaoke.db")
}
