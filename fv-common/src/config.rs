//! Configuration loading for FarmVision services
//!
//! Resolution priority for every setting:
//! 1. Environment variable (`FARMVISION_*`)
//! 2. TOML config file (`~/.config/farmvision/<service>.toml`)
//! 3. Compiled default
//!
//! Each service owns its typed config struct and resolves it from the
//! generic [`TomlConfig`] table loaded here.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Raw TOML configuration shared by FarmVision services.
///
/// All fields optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data directory (database, uploads) override
    pub data_dir: Option<String>,
    /// Directory for staged upload files
    pub upload_dir: Option<String>,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: Option<u64>,
    /// Base URL of the inference service
    pub classifier_url: Option<String>,
    /// Round-trip timeout for classifier calls, in seconds
    pub classifier_timeout_secs: Option<u64>,
    /// HTTP listen port
    pub port: Option<u16>,
}

/// Load the TOML config for a service, if a config file exists.
///
/// Returns `Ok(TomlConfig::default())` when no file is present; a file that
/// exists but fails to parse is an error (misconfiguration should be loud).
pub fn load_toml_config(service: &str) -> Result<TomlConfig> {
    let Some(path) = config_file_path(service) else {
        return Ok(TomlConfig::default());
    };
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }
    read_toml_config(&path)
}

/// Read and parse a TOML config file at an explicit path.
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Platform config file path: `<config_dir>/farmvision/<service>.toml`
pub fn config_file_path(service: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("farmvision").join(format!("{}.toml", service)))
}

/// Default data directory: `<data_local_dir>/farmvision`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("farmvision"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/farmvision"))
}

/// Resolve a string setting: ENV → TOML value → default.
pub fn resolve_string(env_var: &str, toml_value: Option<&str>, default: &str) -> String {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    toml_value
        .map(|s| s.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Resolve a numeric setting: ENV → TOML value → default.
///
/// An env value that fails to parse is ignored with a warning rather than
/// aborting startup.
pub fn resolve_u64(env_var: &str, toml_value: Option<u64>, default: u64) -> u64 {
    if let Ok(value) = std::env::var(env_var) {
        match value.parse::<u64>() {
            Ok(parsed) => return parsed,
            Err(_) => warn!("Ignoring non-numeric {}={:?}", env_var, value),
        }
    }
    toml_value.unwrap_or(default)
}
