//! Configuration module for the dashboard server.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 3002)
    pub http_port: u16,
    /// Path to the monitor's CSV log (default: "logs/network_monitor_log.csv")
    pub log_path: String,
    /// Directory holding per-platform configuration (default: "platforms")
    pub platforms_dir: String,
    /// Built frontend served for non-API paths (default: "dist")
    pub static_dir: String,
    /// Optional JSON threshold table overriding the built-in one
    pub thresholds_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 3002,
            log_path: "logs/network_monitor_log.csv".to_string(),
            platforms_dir: "platforms".to_string(),
            static_dir: "dist".to_string(),
            thresholds_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NETHEALTH_HTTP_PORT`: HTTP port (default: 3002)
    /// - `NETHEALTH_LOG_PATH`: monitor log file
    /// - `NETHEALTH_PLATFORMS_DIR`: platform configuration root
    /// - `NETHEALTH_STATIC_DIR`: frontend build directory
    /// - `NETHEALTH_THRESHOLDS`: threshold table JSON file
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut cfg = Self::default();

        if let Some(port_str) = lookup("NETHEALTH_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Some(log_path) = lookup("NETHEALTH_LOG_PATH") {
            cfg.log_path = log_path;
        }

        if let Some(dir) = lookup("NETHEALTH_PLATFORMS_DIR") {
            cfg.platforms_dir = dir;
        }

        if let Some(dir) = lookup("NETHEALTH_STATIC_DIR") {
            cfg.static_dir = dir;
        }

        cfg.thresholds_path = lookup("NETHEALTH_THRESHOLDS").filter(|p| !p.is_empty());

        cfg
    }
}
