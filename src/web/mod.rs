//! Web server module.

mod handlers;

pub use handlers::*;

use crate::analysis::AnomalyAnalyzer;
use crate::config::ServerConfig;
use crate::logs::LogStore;
use crate::platform::ConfigStore;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub logs: LogStore,
    pub platforms: ConfigStore,
    pub analyzer: Arc<AnomalyAnalyzer>,
}

impl AppState {
    pub fn new(config: ServerConfig, analyzer: AnomalyAnalyzer) -> Self {
        Self {
            logs: LogStore::new(&config.log_path),
            platforms: ConfigStore::new(&config.platforms_dir),
            analyzer: Arc::new(analyzer),
            config,
        }
    }
}

/// Web server for the dashboard API and frontend.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes.
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            // Monitor configuration
            .route(
                "/api/config/{platform}",
                get(handlers::handle_get_config).post(handlers::handle_save_config),
            )
            // Log data and analysis
            .route("/api/logs", get(handlers::handle_get_logs))
            .route("/api/anomalies", get(handlers::handle_get_anomalies))
            .route("/api/anomalies/export", get(handlers::handle_export_anomalies))
            // Frontend build
            .fallback_service(ServeDir::new(&self.state.config.static_dir))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
