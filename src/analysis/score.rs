//! Reduction of an analysis report to a 0-100 severity score.

use serde::Serialize;

use super::anomaly::AnalysisReport;

/// Reduce a report to a score in `[0, 100]`. No report scores 0.
///
/// Half the score comes from anomaly density (maxed out once 10% of records
/// are anomalous); the rest from the capped pattern counters.
pub fn calculate_anomaly_score(report: Option<&AnalysisReport>) -> u8 {
    let Some(report) = report else {
        return 0;
    };

    let density = if report.total_records == 0 {
        0.0
    } else {
        let rate = report.anomalies.total() as f64 / report.total_records as f64;
        (rate * 100.0 * 5.0).min(50.0)
    };

    let p = &report.patterns;
    let patterns = (p.frequent_disconnections as f64 * 2.0).min(10.0)
        + (p.signal_drops as f64 * 0.5).min(10.0)
        + (p.high_latency_periods as f64 * 0.3).min(15.0)
        + (p.packet_loss_bursts as f64).min(15.0);

    // Both terms are non-negative, so rounding half away from zero is round-half-up
    (density + patterns).round().min(100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLevel {
    Normal,
    Low,
    Medium,
    High,
    Critical,
}

impl AnomalyLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => AnomalyLevel::Critical,
            60..=79 => AnomalyLevel::High,
            40..=59 => AnomalyLevel::Medium,
            20..=39 => AnomalyLevel::Low,
            _ => AnomalyLevel::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnomalyLevel::Critical => "重大",
            AnomalyLevel::High => "高",
            AnomalyLevel::Medium => "中",
            AnomalyLevel::Low => "低",
            AnomalyLevel::Normal => "正常",
        }
    }

    /// Display color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            AnomalyLevel::Critical => "#F44336",
            AnomalyLevel::High => "#FF9800",
            AnomalyLevel::Medium => "#FFC107",
            AnomalyLevel::Low => "#4CAF50",
            AnomalyLevel::Normal => "#2196F3",
        }
    }
}

/// Level with its display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub level: AnomalyLevel,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn get_anomaly_level(score: u8) -> LevelInfo {
    let level = AnomalyLevel::from_score(score);
    LevelInfo {
        level,
        label: level.label(),
        color: level.color(),
    }
}
