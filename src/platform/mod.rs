//! Per-platform monitor configuration.
//!
//! Each supported platform (macOS, Windows, Ubuntu) keeps a shell-style
//! `network_monitor.conf` under `<platforms_dir>/<platform>/config/`.

mod conf;
mod store;

pub use conf::*;
pub use store::*;

use thiserror::Error;

/// Platform configuration error types.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("invalid platform name: {0:?}")]
    InvalidName(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
