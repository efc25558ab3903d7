//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// The three figures reported by one speed-test run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedMetrics {
    /// Round-trip latency in milliseconds
    pub ping_ms: f64,
    /// Download throughput in Mbit/s
    pub download_mbps: f64,
    /// Upload throughput in Mbit/s
    pub upload_mbps: f64,
}

impl SpeedMetrics {
    /// Values recorded when no measurement could be taken
    pub const ZERO: SpeedMetrics = SpeedMetrics {
        ping_ms: 0.0,
        download_mbps: 0.0,
        upload_mbps: 0.0,
    };

    pub fn new(ping_ms: f64, download_mbps: f64, upload_mbps: f64) -> Self {
        Self { ping_ms, download_mbps, upload_mbps }
    }
}

/// Result of attempting a measurement
///
/// A failed run still produces a (zero-valued) log row, but the failure
/// reason travels with it so callers can tell it apart from a genuinely
/// dead connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementOutcome {
    /// The utility ran and all three values were extracted
    Measured(SpeedMetrics),
    /// The utility failed or its output could not be parsed
    Failed { reason: String },
}

impl MeasurementOutcome {
    /// Create a failed outcome from any error
    pub fn failed<E: std::fmt::Display>(error: E) -> Self {
        Self::Failed { reason: error.to_string() }
    }

    /// Metrics to record: the measured values, or zeros on failure
    pub fn metrics(&self) -> SpeedMetrics {
        match self {
            Self::Measured(metrics) => *metrics,
            Self::Failed { .. } => SpeedMetrics::ZERO,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Failure reason, if any
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Measured(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}
