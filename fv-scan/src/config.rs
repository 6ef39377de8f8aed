//! Configuration resolution for fv-scan
//!
//! Every setting resolves ENV → TOML (`~/.config/farmvision/fv-scan.toml`)
//! → compiled default, via the shared loaders in `fv_common::config`.

use fv_common::config::{self, TomlConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Default classifier round-trip bound, seconds.
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
/// Default upload ceiling: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_PORT: u64 = 3000;
const DEFAULT_CLASSIFIER_URL: &str = "http://localhost:8000";

/// Resolved runtime configuration for the scan service.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Staging directory for uploaded images
    pub upload_dir: PathBuf,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,
    /// Base URL of the inference service
    pub classifier_url: String,
    /// Bound on classifier round-trip time
    pub classifier_timeout: Duration,
}

impl ScanConfig {
    /// Resolve configuration from environment, TOML file, and defaults.
    pub fn resolve() -> fv_common::Result<Self> {
        let toml = config::load_toml_config("fv-scan")?;
        Ok(Self::from_toml(&toml))
    }

    /// Resolve against an already-loaded TOML table (separated for tests).
    pub fn from_toml(toml: &TomlConfig) -> Self {
        let data_dir = PathBuf::from(config::resolve_string(
            "FARMVISION_DATA_DIR",
            toml.data_dir.as_deref(),
            &config::default_data_dir().display().to_string(),
        ));

        let upload_dir = PathBuf::from(config::resolve_string(
            "FARMVISION_UPLOAD_DIR",
            toml.upload_dir.as_deref(),
            &data_dir.join("uploads").display().to_string(),
        ));

        Self {
            port: config::resolve_u64("FARMVISION_PORT", toml.port.map(u64::from), DEFAULT_PORT)
                as u16,
            database_path: data_dir.join("farmvision.db"),
            upload_dir,
            max_upload_bytes: config::resolve_u64(
                "FARMVISION_MAX_FILE_SIZE",
                toml.max_upload_bytes,
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
            classifier_url: config::resolve_string(
                "FARMVISION_CLASSIFIER_URL",
                toml.classifier_url.as_deref(),
                DEFAULT_CLASSIFIER_URL,
            ),
            classifier_timeout: Duration::from_secs(config::resolve_u64(
                "FARMVISION_CLASSIFIER_TIMEOUT_SECS",
                toml.classifier_timeout_secs,
                DEFAULT_CLASSIFIER_TIMEOUT_SECS,
            )),
        }
    }
}
