//! HTTP request handlers.

use super::AppState;
use crate::analysis::{calculate_anomaly_score, get_anomaly_level, AnalysisExport, AnalysisReport, LevelInfo};
use crate::logs::{LogEntry, LogError, LogRange, Sample};
use crate::platform::{PlatformConfig, PlatformError};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

const LOG_MISSING_MESSAGE: &str =
    "ログファイルが見つかりません。ネットワーク監視を開始してください。";

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// ============================================================================
// API: Platform configuration
// ============================================================================

pub async fn handle_get_config(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> impl IntoResponse {
    match state.platforms.load(&platform) {
        Ok(config) => Json(config).into_response(),
        Err(e @ PlatformError::InvalidName(_)) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            tracing::error!("Error loading config for {}: {}", platform, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load configuration")
        }
    }
}

pub async fn handle_save_config(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Json(config): Json<PlatformConfig>,
) -> impl IntoResponse {
    match state.platforms.save(&platform, &config) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e @ PlatformError::InvalidName(_)) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            tracing::error!("Error saving config for {}: {}", platform, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save configuration")
        }
    }
}

// ============================================================================
// API: Logs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: Option<String>,
}

impl RangeQuery {
    fn log_range(&self) -> LogRange {
        LogRange::parse(self.range.as_deref())
    }
}

pub async fn handle_get_logs(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let range = query.log_range();
    match state.logs.load(range, Local::now().naive_local()) {
        Ok(samples) => {
            let entries: Vec<LogEntry> = samples
                .into_iter()
                .map(|s| LogEntry::new(s, range))
                .collect();
            Json(entries).into_response()
        }
        Err(LogError::NotFound(path)) => {
            tracing::info!("Log file not found, returning empty data");
            Json(json!({
                "data": [],
                "message": LOG_MISSING_MESSAGE,
                "logPath": path.display().to_string(),
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!("Error reading log file: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read log file")
        }
    }
}

/// Samples for analysis; a missing log is an empty batch.
fn load_samples(state: &AppState, range: LogRange) -> Result<Vec<Sample>, Response> {
    match state.logs.load(range, Local::now().naive_local()) {
        Ok(samples) => Ok(samples),
        Err(LogError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => {
            tracing::error!("Error reading log file: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read log file",
            ))
        }
    }
}

// ============================================================================
// API: Anomaly analysis
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AnomalyResponse {
    pub score: u8,
    pub level: LevelInfo,
    pub report: Option<AnalysisReport>,
}

pub async fn handle_get_anomalies(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let samples = match load_samples(&state, query.log_range()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let report = state.analyzer.analyze(&samples);
    let score = calculate_anomaly_score(report.as_ref());

    Json(AnomalyResponse {
        score,
        level: get_anomaly_level(score),
        report,
    })
    .into_response()
}

pub async fn handle_export_anomalies(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let range = query.log_range();
    let samples = match load_samples(&state, range) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let Some(report) = state.analyzer.analyze(&samples) else {
        return error_response(StatusCode::NOT_FOUND, "No data to analyze");
    };

    let export = AnalysisExport::new(&report, range, Utc::now());
    let disposition = format!("attachment; filename=\"{}\"", export.file_name());

    ([(header::CONTENT_DISPOSITION, disposition)], Json(export)).into_response()
}

#[cfg(test)]
mod tests {
    use crate::analysis::AnomalyAnalyzer;
    use crate::config::ServerConfig;
    use crate::web::{AppState, Server};

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Local};
    use serde_json::Value;
    use std::io::Write;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const HEADER: &str = "Timestamp,RouterPingAvg(ms),RouterPingMax(ms),RouterLoss(%),ExternalPingAvg(ms),ExternalPingMax(ms),ExternalLoss(%),Signal(dBm),Noise(dBm),TransmitRate(Mbps),ConnectionType,InterfaceName,SSID,Channel";

    fn server(dir: &TempDir) -> Server {
        let config = ServerConfig {
            log_path: dir.path().join("log.csv").display().to_string(),
            platforms_dir: dir.path().join("platforms").display().to_string(),
            static_dir: dir.path().join("dist").display().to_string(),
            ..Default::default()
        };
        Server::new(AppState::new(config, AnomalyAnalyzer::default()))
    }

    /// Write a log with `rows` recent samples, every fifth one disconnected.
    fn write_log(dir: &TempDir, rows: i64) {
        let mut file = std::fs::File::create(dir.path().join("log.csv")).unwrap();
        writeln!(file, "{HEADER}").unwrap();

        let now = Local::now().naive_local();
        for i in 0..rows {
            let ts = (now - Duration::minutes(rows - i)).format("%Y-%m-%d %H:%M:%S");
            let conn = if i % 5 == 0 { "Disconnected" } else { "Wi-Fi" };
            writeln!(file, "{ts},3.1,5.0,0,20.4,31.0,0,-50,-92,600,{conn},en0,home-net,36").unwrap();
        }
    }

    async fn get(server: &Server, uri: &str) -> (StatusCode, Value) {
        let resp = server
            .routes()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_logs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(&server(&dir), "/api/logs?range=7d").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], Value::Array(vec![]));
        assert!(body["logPath"].as_str().unwrap().ends_with("log.csv"));
    }

    #[tokio::test]
    async fn test_logs_returns_samples() {
        let dir = tempfile::tempdir().unwrap();
        write_log(&dir, 12);

        let (status, body) = get(&server(&dir), "/api/logs").await;
        assert_eq!(status, StatusCode::OK);

        let samples = body.as_array().unwrap();
        assert_eq!(samples.len(), 12);
        assert_eq!(samples[0]["routerPingAvg"], 3.1);
        assert_eq!(samples[0]["connectionType"], "Disconnected");

        // 24h labels are time only
        let full = samples[0]["fullTime"].as_str().unwrap();
        assert_eq!(full.len(), 19);
        assert_eq!(samples[0]["time"], &full[11..16]);
    }

    #[tokio::test]
    async fn test_logs_labels_include_date_for_longer_ranges() {
        let dir = tempfile::tempdir().unwrap();
        write_log(&dir, 3);

        let (status, body) = get(&server(&dir), "/api/logs?range=7d").await;
        assert_eq!(status, StatusCode::OK);

        let first = &body.as_array().unwrap()[0];
        let full = first["fullTime"].as_str().unwrap();
        let time = first["time"].as_str().unwrap();
        // "YYYY/MM/DD HH:MM:SS" against "MM/DD HH:MM"
        assert_eq!(time, &full[5..16]);
    }

    #[tokio::test]
    async fn test_anomalies_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(&server(&dir), "/api/anomalies").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 0);
        assert_eq!(body["level"]["level"], "normal");
        assert!(body["report"].is_null());
    }

    #[tokio::test]
    async fn test_anomalies_report() {
        let dir = tempfile::tempdir().unwrap();
        write_log(&dir, 20);

        let (status, body) = get(&server(&dir), "/api/anomalies?range=24h").await;
        assert_eq!(status, StatusCode::OK);

        // 4 of 20 disconnected: density 50 (capped) + disconnections 8
        assert_eq!(body["score"], 58);
        assert_eq!(body["level"]["level"], "medium");
        assert_eq!(body["report"]["totalRecords"], 20);
        assert_eq!(body["report"]["patterns"]["frequentDisconnections"], 4);
        assert_eq!(
            body["report"]["anomalies"]["connectionErrors"].as_array().unwrap().len(),
            4
        );
        assert_eq!(body["report"]["statistics"]["signal"]["max"], 50.0);
    }

    #[tokio::test]
    async fn test_export() {
        let dir = tempfile::tempdir().unwrap();
        let srv = server(&dir);

        let (status, _) = get(&srv, "/api/anomalies/export").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        write_log(&dir, 10);
        let resp = srv
            .routes()
            .oneshot(Request::get("/api/anomalies/export?range=30d").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"network-anomaly-report-"));

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["timeRange"], "30d");
        assert_eq!(json["summary"]["totalAnomalies"], 2);
        assert_eq!(json["details"]["totalRecords"], 10);
    }

    #[tokio::test]
    async fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let srv = server(&dir);

        let (status, body) = get(&srv, "/api/config/ubuntu").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["SCHEDULER"], "systemd");
        assert_eq!(body["PING_COUNT"], 3.0);

        let payload = r#"{"PING_COUNT":7,"EXTERNAL_TARGETS":["9.9.9.9"],"DEBUG":true}"#;
        let resp = srv
            .routes()
            .oneshot(
                Request::post("/api/config/ubuntu")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let (_, body) = get(&srv, "/api/config/ubuntu").await;
        assert_eq!(body["PING_COUNT"], 7.0);
        assert_eq!(body["EXTERNAL_TARGETS"][0], "9.9.9.9");
        assert_eq!(body["DEBUG"], true);
        assert!(body.get("SCHEDULER").is_none());
    }

    #[tokio::test]
    async fn test_config_rejects_bad_platform() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(&server(&dir), "/api/config/bad%20name").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid platform name"));
    }
}
