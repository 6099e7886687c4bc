//! Monitor log model types.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the network monitor log.
///
/// Numeric fields are `None` when the monitor could not measure them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub router_ping_avg: Option<f64>,
    pub router_ping_max: Option<f64>,
    /// Percent; the reader fills 0 when the column is empty.
    pub router_loss: Option<f64>,
    pub external_ping_avg: Option<f64>,
    pub external_ping_max: Option<f64>,
    /// Percent; the reader fills 0 when the column is empty.
    pub external_loss: Option<f64>,
    /// dBm, zero or negative.
    pub signal: Option<f64>,
    pub noise: Option<f64>,
    /// Mbps
    pub transmit_rate: Option<f64>,
    pub connection_type: Option<String>,
    pub interface_name: Option<String>,
    pub ssid: Option<String>,
    pub channel: Option<String>,
}

impl Sample {
    /// A sample at `timestamp` with every measurement missing.
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            router_ping_avg: None,
            router_ping_max: None,
            router_loss: None,
            external_ping_avg: None,
            external_ping_max: None,
            external_loss: None,
            signal: None,
            noise: None,
            transmit_rate: None,
            connection_type: None,
            interface_name: None,
            ssid: None,
            channel: None,
        }
    }
}

/// A sample as served to the dashboard, with display labels for the chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(flatten)]
    pub sample: Sample,
    /// Chart axis label; coarser ranges include the date.
    pub time: String,
    /// Tooltip label, `YYYY/MM/DD HH:MM:SS`.
    pub full_time: String,
}

impl LogEntry {
    pub fn new(sample: Sample, range: LogRange) -> Self {
        Self {
            time: sample.timestamp.format(range.time_format()).to_string(),
            full_time: sample.timestamp.format("%Y/%m/%d %H:%M:%S").to_string(),
            sample,
        }
    }
}

/// Look-back window for log queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl LogRange {
    /// Parse a range label; unknown labels fall back to 24h.
    pub fn parse(label: Option<&str>) -> Self {
        match label {
            Some("7d") => LogRange::Week,
            Some("30d") => LogRange::Month,
            _ => LogRange::Day,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogRange::Day => "24h",
            LogRange::Week => "7d",
            LogRange::Month => "30d",
        }
    }

    pub fn duration(&self) -> ChronoDuration {
        match self {
            LogRange::Day => ChronoDuration::hours(24),
            LogRange::Week => ChronoDuration::days(7),
            LogRange::Month => ChronoDuration::days(30),
        }
    }

    /// strftime pattern for the chart label of samples in this range.
    pub fn time_format(&self) -> &'static str {
        match self {
            LogRange::Day => "%H:%M",
            LogRange::Week | LogRange::Month => "%m/%d %H:%M",
        }
    }

    /// Earliest timestamp included when querying at `now`.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now - self.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_range_parse() {
        assert_eq!(LogRange::parse(Some("7d")), LogRange::Week);
        assert_eq!(LogRange::parse(Some("30d")), LogRange::Month);
        assert_eq!(LogRange::parse(Some("24h")), LogRange::Day);
        assert_eq!(LogRange::parse(Some("1y")), LogRange::Day);
        assert_eq!(LogRange::parse(None), LogRange::Day);
    }

    #[test]
    fn test_range_cutoff() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 6, 23)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(LogRange::Week.cutoff(now), expected);
    }

    #[test]
    fn test_entry_labels_follow_range() {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap();

        let day = LogEntry::new(Sample::empty(ts), LogRange::Day);
        assert_eq!(day.time, "07:05");
        assert_eq!(day.full_time, "2024/06/03 07:05:09");

        let week = LogEntry::new(Sample::empty(ts), LogRange::Week);
        assert_eq!(week.time, "06/03 07:05");
        assert_eq!(week.full_time, "2024/06/03 07:05:09");

        let month = LogEntry::new(Sample::empty(ts), LogRange::Month);
        assert_eq!(month.time, "06/03 07:05");
    }

    #[test]
    fn test_entry_serializes_flat() {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let sample = Sample {
            router_ping_avg: Some(2.5),
            ..Sample::empty(ts)
        };

        let json = serde_json::to_value(LogEntry::new(sample, LogRange::Day)).unwrap();
        assert_eq!(json["timestamp"], "2024-06-10T12:00:00");
        assert_eq!(json["routerPingAvg"], 2.5);
        assert_eq!(json["time"], "12:00");
        assert_eq!(json["fullTime"], "2024/06/10 12:00:00");
    }
}
