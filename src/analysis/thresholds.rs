//! Fixed severity thresholds used to classify individual samples.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Threshold loading errors.
#[derive(Error, Debug)]
pub enum ThresholdError {
    #[error("failed to read threshold file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid threshold file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid thresholds for {metric}: expected warning <= critical <= outlier")]
    Order { metric: &'static str },
}

/// Warning, critical and outlier levels for one metric.
///
/// A value strictly greater than a level is considered past it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub warning: f64,
    pub critical: f64,
    pub outlier: f64,
}

impl MetricThresholds {
    pub const fn new(warning: f64, critical: f64, outlier: f64) -> Self {
        Self {
            warning,
            critical,
            outlier,
        }
    }

    fn is_ordered(&self) -> bool {
        self.warning <= self.critical && self.critical <= self.outlier
    }
}

/// Threshold table owned by the anomaly analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Router ping in ms.
    pub router_ping: MetricThresholds,
    /// External ping in ms.
    pub external_ping: MetricThresholds,
    /// Router or external packet loss in percent.
    pub packet_loss: MetricThresholds,
    /// Signal magnitude in |dBm|.
    pub signal_strength: MetricThresholds,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            router_ping: MetricThresholds::new(10.0, 50.0, 100.0),
            external_ping: MetricThresholds::new(30.0, 100.0, 500.0),
            packet_loss: MetricThresholds::new(1.0, 5.0, 20.0),
            signal_strength: MetricThresholds::new(60.0, 70.0, 80.0),
        }
    }
}

impl Thresholds {
    /// Load a threshold table from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ThresholdError> {
        let content = std::fs::read_to_string(path)?;
        let thresholds: Thresholds = serde_json::from_str(&content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that every metric has non-decreasing levels.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let metrics = [
            ("routerPing", &self.router_ping),
            ("externalPing", &self.external_ping),
            ("packetLoss", &self.packet_loss),
            ("signalStrength", &self.signal_strength),
        ];

        for (metric, levels) in metrics {
            if !levels.is_ordered() {
                return Err(ThresholdError::Order { metric });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_table() {
        let t = Thresholds::default();
        assert_eq!(t.router_ping, MetricThresholds::new(10.0, 50.0, 100.0));
        assert_eq!(t.external_ping.outlier, 500.0);
        assert_eq!(t.packet_loss.critical, 5.0);
        assert_eq!(t.signal_strength.outlier, 80.0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut custom = Thresholds::default();
        custom.router_ping = MetricThresholds::new(5.0, 20.0, 40.0);

        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{}", serde_json::to_string(&custom).unwrap()).unwrap();

        let loaded = Thresholds::load(tmp.path()).unwrap();
        assert_eq!(loaded, custom);
    }

    #[test]
    fn test_rejects_unordered_levels() {
        let mut custom = Thresholds::default();
        custom.signal_strength = MetricThresholds::new(80.0, 70.0, 60.0);

        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{}", serde_json::to_string(&custom).unwrap()).unwrap();

        match Thresholds::load(tmp.path()) {
            Err(ThresholdError::Order { metric }) => assert_eq!(metric, "signalStrength"),
            other => panic!("expected order error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Thresholds::load("/nonexistent/thresholds.json"),
            Err(ThresholdError::Io(_))
        ));
    }
}
