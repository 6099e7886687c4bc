//! nethealth - home network health dashboard backend
//!
//! Serves the Wi-Fi/router/external connectivity log written by the network
//! monitor, per-platform monitor configuration, and anomaly analysis of the
//! logged samples.

pub mod analysis;
pub mod config;
pub mod logs;
pub mod platform;
pub mod web;
