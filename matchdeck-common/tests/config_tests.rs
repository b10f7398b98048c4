//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate MATCHDECK_CONFIG are marked with #[serial] so they
//! never race each other on the process environment.

use matchdeck_common::config::{
    default_config_path, load_toml_or_default, parse_toml, resolve_config_path, CONFIG_ENV_VAR,
};
use matchdeck_common::Error;
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct SampleConfig {
    #[serde(default)]
    name: String,
    #[serde(default)]
    limit: u32,
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")), CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    // Falls through to the platform path, which only counts if it exists
    assert_eq!(resolved, default_config_path().filter(|p| p.exists()));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_default_path_ends_with_matchdeck_config() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with(Path::new("matchdeck").join("config.toml")));
    }
}

#[test]
fn test_missing_file_yields_defaults() {
    let config: SampleConfig =
        load_toml_or_default(Some(Path::new("/nonexistent/matchdeck/config.toml"))).unwrap();
    assert_eq!(config, SampleConfig::default());

    let config: SampleConfig = load_toml_or_default(None).unwrap();
    assert_eq!(config, SampleConfig::default());
}

#[test]
fn test_existing_file_is_parsed() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name = \"campus\"\nlimit = 7").unwrap();

    let config: SampleConfig = load_toml_or_default(Some(file.path())).unwrap();
    assert_eq!(
        config,
        SampleConfig {
            name: "campus".to_string(),
            limit: 7
        }
    );
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "limit = = 3").unwrap();

    let err = load_toml_or_default::<SampleConfig>(Some(file.path())).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains(&file.path().display().to_string())),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_parse_toml_reports_type_mismatch() {
    let err = parse_toml::<SampleConfig>("limit = \"seven\"").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
