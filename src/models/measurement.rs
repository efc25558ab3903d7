//! Timestamped measurement row written to the CSV log

use crate::types::SpeedMetrics;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date format of the first CSV column (MM/DD/YY)
pub const DATE_FORMAT: &str = "%m/%d/%y";
/// Time format of the second CSV column (HH:MM, 24h)
pub const TIME_FORMAT: &str = "%H:%M";

/// One row of the speed log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub date: String,
    pub time: String,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl MeasurementResult {
    /// Build a row for the given local wall-clock time
    pub fn new(metrics: SpeedMetrics, timestamp: NaiveDateTime) -> Self {
        Self {
            date: timestamp.format(DATE_FORMAT).to_string(),
            time: timestamp.format(TIME_FORMAT).to_string(),
            ping_ms: metrics.ping_ms,
            download_mbps: metrics.download_mbps,
            upload_mbps: metrics.upload_mbps,
        }
    }

    /// Build a row stamped with the current local time
    pub fn now(metrics: SpeedMetrics) -> Self {
        Self::new(metrics, Local::now().naive_local())
    }

    pub fn metrics(&self) -> SpeedMetrics {
        SpeedMetrics::new(self.ping_ms, self.download_mbps, self.upload_mbps)
    }

    /// Fields in CSV column order
    pub fn csv_record(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.time.clone(),
            format!("{:?}", self.ping_ms),
            format!("{:?}", self.download_mbps),
            format!("{:?}", self.upload_mbps),
        ]
    }

    /// Console line printed before the upload starts
    pub fn display_line(&self) -> String {
        format!(
            "{}, {}, {:.6}, {:.6}, {:.6}",
            self.date, self.time, self.ping_ms, self.download_mbps, self.upload_mbps
        )
    }
}
