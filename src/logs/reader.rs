//! CSV log reader.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::{LogRange, Sample};

/// Log access error types.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("log file not found: {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row as written by the monitor script.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogRow {
    #[serde(rename = "Timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "RouterPingAvg(ms)")]
    router_ping_avg: Option<String>,
    #[serde(rename = "RouterPingMax(ms)")]
    router_ping_max: Option<String>,
    #[serde(rename = "RouterLoss(%)")]
    router_loss: Option<String>,
    #[serde(rename = "ExternalPingAvg(ms)")]
    external_ping_avg: Option<String>,
    #[serde(rename = "ExternalPingMax(ms)")]
    external_ping_max: Option<String>,
    #[serde(rename = "ExternalLoss(%)")]
    external_loss: Option<String>,
    #[serde(rename = "Signal(dBm)")]
    signal: Option<String>,
    #[serde(rename = "Noise(dBm)")]
    noise: Option<String>,
    #[serde(rename = "TransmitRate(Mbps)")]
    transmit_rate: Option<String>,
    #[serde(rename = "ConnectionType")]
    connection_type: Option<String>,
    #[serde(rename = "InterfaceName")]
    interface_name: Option<String>,
    #[serde(rename = "SSID")]
    ssid: Option<String>,
    #[serde(rename = "Channel")]
    channel: Option<String>,
}

impl LogRow {
    /// Convert to a sample; `None` when the timestamp is unusable.
    fn into_sample(self) -> Option<Sample> {
        let timestamp = parse_timestamp(self.timestamp.as_deref()?)?;

        Some(Sample {
            timestamp,
            router_ping_avg: parse_metric(self.router_ping_avg.as_deref()),
            router_ping_max: parse_metric(self.router_ping_max.as_deref()),
            router_loss: Some(parse_metric(self.router_loss.as_deref()).unwrap_or(0.0)),
            external_ping_avg: parse_metric(self.external_ping_avg.as_deref()),
            external_ping_max: parse_metric(self.external_ping_max.as_deref()),
            external_loss: Some(parse_metric(self.external_loss.as_deref()).unwrap_or(0.0)),
            signal: parse_metric(self.signal.as_deref()),
            noise: parse_metric(self.noise.as_deref()),
            transmit_rate: parse_metric(self.transmit_rate.as_deref()),
            connection_type: self.connection_type,
            interface_name: self.interface_name,
            ssid: self.ssid,
            channel: self.channel,
        })
    }
}

/// Reads samples from the monitor's CSV log file.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load samples newer than `now - range`, sorted oldest first.
    pub fn load(&self, range: LogRange, now: NaiveDateTime) -> Result<Vec<Sample>, LogError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LogError::NotFound(self.path.clone()),
            _ => LogError::Io(e),
        })?;

        let samples = read_samples(file, range.cutoff(now))?;
        tracing::debug!(
            "Loaded {} samples from {} (range {})",
            samples.len(),
            self.path.display(),
            range.label()
        );

        Ok(samples)
    }
}

/// Parse CSV rows at or after `cutoff`, sorted oldest first.
pub fn read_samples<R: Read>(input: R, cutoff: NaiveDateTime) -> Result<Vec<Sample>, LogError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    // SSIDs come from netsh/airport output and are not always UTF-8
    let headers = csv::StringRecord::from_byte_record_lossy(reader.byte_headers()?.clone());

    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for record in reader.byte_records() {
        let record = csv::StringRecord::from_byte_record_lossy(record?);
        let sample = match record.deserialize::<LogRow>(Some(&headers)) {
            Ok(row) => row.into_sample(),
            Err(e) => {
                tracing::debug!("Unreadable log row: {}", e);
                None
            }
        };

        match sample {
            Some(sample) if sample.timestamp >= cutoff => samples.push(sample),
            Some(_) => {}
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} unreadable log rows", skipped);
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Parse a numeric column. Empty, unparseable, non-finite and zero readings
/// are treated as missing; the monitor writes 0 when a probe failed.
fn parse_metric(raw: Option<&str>) -> Option<f64> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// Parse a log timestamp in any of the formats the monitor scripts emit.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    let s = s.trim();
    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}
