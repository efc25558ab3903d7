//! Extraction of ping/download/upload figures from `--simple` output
//!
//! The utility prints lines such as:
//!
//! ```text
//! Ping: 12.3 ms
//! Download: 45.6 Mbit/s
//! Upload: 7.8 Mbit/s
//! ```

use crate::error::{AppError, Result};
use crate::types::SpeedMetrics;
use regex::Regex;

/// Pattern-based parser for speed-test output
pub struct ResultParser {
    ping: Regex,
    download: Regex,
    upload: Regex,
}

impl ResultParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ping: label_pattern("Ping")?,
            download: label_pattern("Download")?,
            upload: label_pattern("Upload")?,
        })
    }

    /// Extract all three figures; fails if any is missing or not numeric
    pub fn parse(&self, output: &str) -> Result<SpeedMetrics> {
        Ok(SpeedMetrics {
            ping_ms: extract(&self.ping, "Ping", output)?,
            download_mbps: extract(&self.download, "Download", output)?,
            upload_mbps: extract(&self.upload, "Upload", output)?,
        })
    }
}

/// `<label>:` followed by whitespace, capturing the next token
fn label_pattern(label: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?m){}:\s+(\S+)", regex::escape(label)))
        .map_err(|e| AppError::internal(format!("Invalid pattern for '{}': {}", label, e)))
}

/// First match only
fn extract(pattern: &Regex, label: &str, output: &str) -> Result<f64> {
    let token = pattern
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::parse(format!("No '{}:' value in speed-test output", label)))?;

    let value: f64 = token
        .parse()
        .map_err(|e| AppError::parse(format!("{} value '{}' is not a number: {}", label, token, e)))?;

    if !value.is_finite() {
        return Err(AppError::parse(format!("{} value '{}' is not finite", label, token)));
    }

    Ok(value)
}
