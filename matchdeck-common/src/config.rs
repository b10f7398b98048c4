//! Configuration file resolution and TOML loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/matchdeck/config.toml`), if present
//! 4. None: caller falls back to built-in defaults
//!
//! A missing config file is never fatal. Hosts log a warning and carry on
//! with compiled defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MATCHDECK_CONFIG";

/// Resolve which config file (if any) should be read
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Default config file location for the platform
///
/// Linux: `~/.config/matchdeck/config.toml`
/// macOS: `~/Library/Application Support/matchdeck/config.toml`
/// Windows: `%APPDATA%\matchdeck\config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("matchdeck").join("config.toml"))
}

/// Load a TOML document into `T`, falling back to `T::default()`
///
/// - `None` path: defaults
/// - Path that does not exist: warning + defaults
/// - Unreadable file or malformed TOML: error
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        debug!("No config file resolved, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file not found: {}, using built-in defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;
    parse_toml(&content).map_err(|e| match e {
        Error::Parse(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse a TOML string into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
}
