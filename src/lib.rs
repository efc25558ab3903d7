//! Speedtest Logger
//!
//! Runs an external speed-test utility, appends the measured ping, download
//! and upload figures to a CSV log, and mirrors the log to Google Drive,
//! replacing the previous copy.

pub mod app;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod error;
pub mod logging;
pub mod measurement;
pub mod models;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, MeasurementResult};
pub use types::{MeasurementOutcome, SpeedMetrics};
pub use app::{App, RunReport};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// One-line build description used by `--debug`
pub fn version_info() -> String {
    format!("{} v{} ({}, built {})", PKG_NAME, VERSION, GIT_COMMIT, BUILD_TIME)
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_LOG_FILE: &str = "internet_speedtest.csv";
    pub const DEFAULT_CREDENTIALS_FILE: &str = "mycreds.txt";
    pub const DEFAULT_CLIENT_SECRETS_FILE: &str = "client_secrets.json";
    pub const DEFAULT_DRIVE_FOLDER: &str = "root";
    pub const DEFAULT_SPEEDTEST_COMMAND: &str = "speedtest-cli";
    pub const DEFAULT_SPEEDTEST_ARGS: &[&str] = &["--simple"];
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_UPLOAD_ENABLED: bool = true;

    /// Fixed five-column CSV header
    pub const CSV_HEADER: &[&str] = &[
        "Date",
        "Time",
        "Ping [ms]",
        "Download Speed [Mbit/s]",
        "Upload Speed [Mbit/s]",
    ];

    pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";
    pub const OAUTH_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
    pub const OAUTH_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
    pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

    /// Loopback ports tried in order for the interactive authorization flow
    pub const OAUTH_REDIRECT_PORTS: &[u16] = &[8080, 8090];

    /// How long the redirect listener waits for the browser
    pub const OAUTH_CALLBACK_TIMEOUT_SECS: u64 = 300;

    /// Upper bound accepted for an explicit measurement timeout
    pub const MAX_MEASUREMENT_TIMEOUT_SECS: u64 = 3600;
}
