//! Command-line interface
//!
//! Every flag is optional: a bare `speedlog` runs one measurement with the
//! defaults and uploads the log.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Speedtest Logger - measure ping, download and upload, log them to CSV and mirror the log to Google Drive
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "speedlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// CSV log file to append to
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Stored Google Drive credentials
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// OAuth client secrets used for first-time authorization
    #[arg(long, value_name = "PATH")]
    pub client_secrets: Option<PathBuf>,

    /// Drive folder ID to upload into
    #[arg(long, value_name = "ID")]
    pub folder: Option<String>,

    /// Speed-test utility to run
    #[arg(long = "speedtest-cmd", value_name = "PROGRAM")]
    pub speedtest_cmd: Option<String>,

    /// Argument for the speed-test utility (repeatable; replaces --simple)
    #[arg(long = "speedtest-arg", value_name = "ARG", action = ArgAction::Append, allow_hyphen_values = true)]
    pub speedtest_args: Vec<String>,

    /// Kill the speed test after this many seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Only measure and log; skip the Google Drive upload
    #[arg(long)]
    pub no_upload: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

/// Parse a timeout in seconds, accepting an optional `s` suffix
fn parse_timeout(value: &str) -> Result<u64, String> {
    let trimmed = value.trim().trim_end_matches('s');
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("Invalid timeout '{}': expected a number of seconds", value))?;

    if secs == 0 {
        return Err("Timeout must be greater than 0".to_string());
    }

    Ok(secs)
}

/// Detect whether the terminal supports colored output
fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    match std::env::var("TERM") {
        Ok(term) => term != "dumb",
        Err(_) => cfg!(windows),
    }
}
