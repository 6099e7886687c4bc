//! nethealth server entry point.

use nethealth::analysis::{AnomalyAnalyzer, Thresholds};
use nethealth::config::ServerConfig;
use nethealth::web::{AppState, Server};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("nethealth=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting nethealth on port {}...", cfg.http_port);
    tracing::info!("Reading monitor log at {}", cfg.log_path);

    let thresholds = match cfg.thresholds_path.as_deref() {
        Some(path) => match Thresholds::load(path) {
            Ok(t) => {
                tracing::info!("Loaded anomaly thresholds from {}", path);
                t
            }
            Err(e) => {
                tracing::warn!("Ignoring threshold file {}: {}; using built-in table", path, e);
                Thresholds::default()
            }
        },
        None => Thresholds::default(),
    };

    // Start web server
    let state = AppState::new(cfg, AnomalyAnalyzer::new(thresholds));
    let server = Server::new(state);
    server.start().await?;

    Ok(())
}
