//! Downloadable analysis report document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::anomaly::{AnalysisReport, TimeRange};
use super::score::{calculate_anomaly_score, get_anomaly_level, LevelInfo};
use crate::logs::LogRange;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_records: usize,
    pub time_range: TimeRange,
    pub total_anomalies: usize,
}

/// Report export: score, level, summary and the full analysis details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport<'a> {
    pub generated_at: DateTime<Utc>,
    pub time_range: LogRange,
    pub anomaly_score: u8,
    pub anomaly_level: LevelInfo,
    pub summary: ExportSummary,
    pub details: &'a AnalysisReport,
}

impl<'a> AnalysisExport<'a> {
    pub fn new(report: &'a AnalysisReport, range: LogRange, generated_at: DateTime<Utc>) -> Self {
        let score = calculate_anomaly_score(Some(report));
        Self {
            generated_at,
            time_range: range,
            anomaly_score: score,
            anomaly_level: get_anomaly_level(score),
            summary: ExportSummary {
                total_records: report.total_records,
                time_range: report.time_range,
                total_anomalies: report.anomalies.total(),
            },
            details: report,
        }
    }

    /// Suggested download file name, dated by generation day.
    pub fn file_name(&self) -> String {
        format!(
            "network-anomaly-report-{}.json",
            self.generated_at.format("%Y-%m-%d")
        )
    }
}
