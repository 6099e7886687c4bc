//! File-backed platform configuration store.

use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::conf::{default_config, generate_config, parse_config, PlatformConfig};
use super::PlatformError;

const CONFIG_FILE: &str = "network_monitor.conf";

/// Reads and writes `<root>/<platform>/config/network_monitor.conf`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration file for a platform.
    pub fn config_path(&self, platform: &str) -> Result<PathBuf, PlatformError> {
        validate_platform(platform)?;
        Ok(self.root.join(platform).join("config").join(CONFIG_FILE))
    }

    /// Load a platform's configuration, falling back to its defaults when the
    /// file cannot be read.
    pub fn load(&self, platform: &str) -> Result<PlatformConfig, PlatformError> {
        let path = self.config_path(platform)?;

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(parse_config(&content)),
            Err(e) => {
                tracing::debug!(
                    "No config at {} ({}), using {} defaults",
                    path.display(),
                    e,
                    platform
                );
                Ok(default_config(platform))
            }
        }
    }

    /// Write a platform's configuration, creating its directory if needed.
    pub fn save(&self, platform: &str, config: &PlatformConfig) -> Result<(), PlatformError> {
        let path = self.config_path(platform)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        std::fs::write(&path, generate_config(config, Utc::now()))?;
        tracing::info!("Saved {} configuration to {}", platform, path.display());
        Ok(())
    }
}

/// Platform names become path components, so only plain identifiers pass.
pub fn validate_platform(platform: &str) -> Result<(), PlatformError> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let name_re = NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

    if name_re.is_match(platform) {
        Ok(())
    } else {
        Err(PlatformError::InvalidName(platform.to_string()))
    }
}
