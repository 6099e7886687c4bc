//! Per-sample anomaly classification and pattern aggregation.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::outlier::{detect_outliers, DistributionStats};
use super::thresholds::Thresholds;
use crate::logs::Sample;

/// Connection type the monitor writes when the interface is down.
pub const DISCONNECTED: &str = "Disconnected";

/// SSID placeholder the monitor writes when no network is joined.
const SSID_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    HighLatency,
    PacketLoss,
    WeakSignal,
    Disconnection,
}

/// Category-specific anomaly data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnomalyPayload {
    Value {
        value: f64,
    },
    #[serde(rename_all = "camelCase")]
    LossPair {
        router_loss: Option<f64>,
        external_loss: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Connection {
        connection_type: Option<String>,
        ssid: Option<String>,
    },
}

/// A single sample flagged in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub timestamp: NaiveDateTime,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AnomalyType,
    #[serde(flatten)]
    pub payload: AnomalyPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyCategory {
    RouterPing,
    ExternalPing,
    PacketLoss,
    SignalStrength,
    ConnectionErrors,
}

impl AnomalyCategory {
    pub const ALL: [AnomalyCategory; 5] = [
        AnomalyCategory::RouterPing,
        AnomalyCategory::ExternalPing,
        AnomalyCategory::PacketLoss,
        AnomalyCategory::SignalStrength,
        AnomalyCategory::ConnectionErrors,
    ];
}

/// Anomaly lists per category, each in batch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyCategories {
    pub router_ping: Vec<Anomaly>,
    pub external_ping: Vec<Anomaly>,
    pub packet_loss: Vec<Anomaly>,
    pub signal_strength: Vec<Anomaly>,
    pub connection_errors: Vec<Anomaly>,
}

impl AnomalyCategories {
    pub fn get(&self, category: AnomalyCategory) -> &[Anomaly] {
        match category {
            AnomalyCategory::RouterPing => &self.router_ping,
            AnomalyCategory::ExternalPing => &self.external_ping,
            AnomalyCategory::PacketLoss => &self.packet_loss,
            AnomalyCategory::SignalStrength => &self.signal_strength,
            AnomalyCategory::ConnectionErrors => &self.connection_errors,
        }
    }

    /// Number of anomalies across all categories.
    pub fn total(&self) -> usize {
        AnomalyCategory::ALL.iter().map(|&c| self.get(c).len()).sum()
    }
}

/// Per-batch tallies of samples meeting a critical condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patterns {
    pub frequent_disconnections: u32,
    pub signal_drops: u32,
    pub high_latency_periods: u32,
    pub packet_loss_bursts: u32,
}

/// Distribution statistics per metric; `None` when there were too few values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub router_ping: Option<DistributionStats>,
    pub external_ping: Option<DistributionStats>,
    pub router_loss: Option<DistributionStats>,
    pub external_loss: Option<DistributionStats>,
    /// Computed over signal magnitudes.
    pub signal: Option<DistributionStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Result of analyzing one batch of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub total_records: usize,
    /// First and last sample in batch order; the batch is not re-sorted.
    pub time_range: TimeRange,
    pub anomalies: AnomalyCategories,
    pub patterns: Patterns,
    pub statistics: Statistics,
}

/// Classifies samples against a threshold table.
#[derive(Debug, Clone, Default)]
pub struct AnomalyAnalyzer {
    thresholds: Thresholds,
}

impl AnomalyAnalyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Analyze a batch of samples. Returns `None` for an empty batch.
    pub fn analyze(&self, samples: &[Sample]) -> Option<AnalysisReport> {
        let (first, last) = (samples.first()?, samples.last()?);

        let mut anomalies = AnomalyCategories::default();
        let mut patterns = Patterns::default();

        for sample in samples {
            self.classify(sample, &mut anomalies);
            self.tally(sample, &mut patterns);
        }

        let report = AnalysisReport {
            total_records: samples.len(),
            time_range: TimeRange {
                start: first.timestamp,
                end: last.timestamp,
            },
            anomalies,
            patterns,
            statistics: compute_statistics(samples),
        };

        tracing::debug!(
            "Analyzed {} samples: {} anomalies, {:?}",
            report.total_records,
            report.anomalies.total(),
            report.patterns
        );

        Some(report)
    }

    /// Append outlier-level anomalies for one sample.
    fn classify(&self, sample: &Sample, anomalies: &mut AnomalyCategories) {
        let t = &self.thresholds;
        let timestamp = sample.timestamp;
        let critical = |kind, payload| Anomaly {
            timestamp,
            severity: Severity::Critical,
            kind,
            payload,
        };

        if let Some(value) = above(sample.router_ping_avg, t.router_ping.outlier) {
            anomalies
                .router_ping
                .push(critical(AnomalyType::HighLatency, AnomalyPayload::Value { value }));
        }

        if let Some(value) = above(sample.external_ping_avg, t.external_ping.outlier) {
            anomalies
                .external_ping
                .push(critical(AnomalyType::HighLatency, AnomalyPayload::Value { value }));
        }

        if exceeds(sample.router_loss, t.packet_loss.outlier)
            || exceeds(sample.external_loss, t.packet_loss.outlier)
        {
            anomalies.packet_loss.push(critical(
                AnomalyType::PacketLoss,
                AnomalyPayload::LossPair {
                    router_loss: sample.router_loss,
                    external_loss: sample.external_loss,
                },
            ));
        }

        if let Some(value) = sample.signal {
            if exceeds(Some(value.abs()), t.signal_strength.outlier) {
                anomalies
                    .signal_strength
                    .push(critical(AnomalyType::WeakSignal, AnomalyPayload::Value { value }));
            }
        }

        if is_connection_error(sample) {
            anomalies.connection_errors.push(critical(
                AnomalyType::Disconnection,
                AnomalyPayload::Connection {
                    connection_type: sample.connection_type.clone(),
                    ssid: sample.ssid.clone(),
                },
            ));
        }
    }

    /// Increment every pattern counter the sample meets.
    fn tally(&self, sample: &Sample, patterns: &mut Patterns) {
        let t = &self.thresholds;

        if exceeds(sample.router_loss, t.packet_loss.critical)
            && exceeds(sample.external_loss, t.packet_loss.critical)
        {
            patterns.packet_loss_bursts += 1;
        }

        if exceeds(sample.router_ping_avg, t.router_ping.critical)
            || exceeds(sample.external_ping_avg, t.external_ping.critical)
        {
            patterns.high_latency_periods += 1;
        }

        if exceeds(sample.signal.map(f64::abs), t.signal_strength.critical) {
            patterns.signal_drops += 1;
        }

        if is_disconnected(sample) {
            patterns.frequent_disconnections += 1;
        }
    }
}

/// Analyze a batch with the built-in threshold table.
pub fn analyze_anomalies(samples: &[Sample]) -> Option<AnalysisReport> {
    AnomalyAnalyzer::default().analyze(samples)
}

fn compute_statistics(samples: &[Sample]) -> Statistics {
    let series = |f: fn(&Sample) -> Option<f64>| -> Vec<Option<f64>> {
        samples.iter().map(f).collect()
    };

    Statistics {
        router_ping: detect_outliers(&series(|s| s.router_ping_avg)),
        external_ping: detect_outliers(&series(|s| s.external_ping_avg)),
        router_loss: detect_outliers(&series(|s| s.router_loss)),
        external_loss: detect_outliers(&series(|s| s.external_loss)),
        signal: detect_outliers(&series(|s| s.signal.map(f64::abs))),
    }
}

/// Missing values never exceed a threshold.
fn exceeds(value: Option<f64>, level: f64) -> bool {
    matches!(value, Some(v) if v > level)
}

fn above(value: Option<f64>, level: f64) -> Option<f64> {
    value.filter(|&v| v > level)
}

fn is_disconnected(sample: &Sample) -> bool {
    sample.connection_type.as_deref() == Some(DISCONNECTED)
}

fn is_connection_error(sample: &Sample) -> bool {
    is_disconnected(sample)
        || match sample.ssid.as_deref() {
            None | Some("") => true,
            Some(ssid) => ssid == SSID_PLACEHOLDER,
        }
}
