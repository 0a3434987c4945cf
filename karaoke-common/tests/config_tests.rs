//! Tests for config file resolution and graceful degradation
//!
//! - Missing or broken config files never abort startup
//! - Priority order: CLI argument > KARAOKE_CONFIG > platform default
//!
//! Tests that touch KARAOKE_CONFIG are marked #[serial] so they never run
//! concurrently with each other.

use karaoke_common::config::{
    resolve_config_path, ConfigOrigin, StoreBackend, TomlConfig, CONFIG_ENV_VAR,
    DEFAULT_CAPACITY,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    env::set_var(CONFIG_ENV_VAR, "/from/env.toml");

    let resolved = resolve_config_path(Some(Path::new("/from/cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/from/cli.toml")));
}

#[test]
#[serial]
fn test_environment_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/from/env.toml");

    let resolved = resolve_config_path(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/from/env.toml")));
}

#[test]
#[serial]
fn test_blank_environment_variable_ignored() {
    env::set_var(CONFIG_ENV_VAR, "  ");

    let resolved = resolve_config_path(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert_ne!(resolved, Some(PathBuf::from("  ")));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let (config, origin) = TomlConfig::load_or_default(Some(&missing));

    assert_eq!(config, TomlConfig::default());
    assert!(matches!(origin, ConfigOrigin::Ignored { ref path, .. } if *path == missing));
}

#[test]
fn test_unparseable_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    let (config, origin) = TomlConfig::load_or_default(Some(&path));

    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.effective_capacity(), Some(DEFAULT_CAPACITY));
    match origin {
        ConfigOrigin::Ignored { reason, .. } => assert!(reason.contains("config.toml")),
        other => panic!("expected ignored config, got {:?}", other),
    }
}

#[test]
fn test_file_values_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "store = \"memory\"\ncapacity = 3\n").unwrap();

    let (config, origin) = TomlConfig::load_or_default(Some(&path));

    assert_eq!(origin, ConfigOrigin::File(path.clone()));
    assert_eq!(config.store, Some(StoreBackend::Memory));
    assert_eq!(config.effective_capacity(), Some(3));
    assert_eq!(config.port, None);
}

#[test]
fn test_no_file_means_defaults() {
    assert_eq!(
        TomlConfig::load_or_default(None),
        (TomlConfig::default(), ConfigOrigin::Defaults)
    );
}
