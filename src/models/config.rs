//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration, passed explicitly to each component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local CSV log (its file name is also the remote file name)
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Stored OAuth credential file
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Google OAuth client secrets, used for first-time authorization
    #[serde(default = "default_client_secrets_file")]
    pub client_secrets_file: PathBuf,

    /// Drive folder ID the log is uploaded into
    #[serde(default = "default_drive_folder")]
    pub drive_folder: String,

    /// Speed-test utility to execute
    #[serde(default = "default_speedtest_command")]
    pub speedtest_command: String,

    /// Arguments passed to the speed-test utility
    #[serde(default = "default_speedtest_args")]
    pub speedtest_args: Vec<String>,

    /// Optional bound on the speed-test run; unbounded when absent
    #[serde(default)]
    pub measurement_timeout_seconds: Option<u64>,

    /// Whether the log is mirrored to Google Drive
    #[serde(default = "default_upload_enabled")]
    pub upload_enabled: bool,

    /// Base URL of the Drive REST API
    #[serde(default = "default_drive_api_base")]
    pub drive_api_base: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            credentials_file: default_credentials_file(),
            client_secrets_file: default_client_secrets_file(),
            drive_folder: default_drive_folder(),
            speedtest_command: default_speedtest_command(),
            speedtest_args: default_speedtest_args(),
            measurement_timeout_seconds: None,
            upload_enabled: default_upload_enabled(),
            drive_api_base: default_drive_api_base(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurement timeout as Duration, if one is configured
    pub fn measurement_timeout(&self) -> Option<Duration> {
        self.measurement_timeout_seconds.map(Duration::from_secs)
    }

    /// Name the log is stored under remotely
    pub fn remote_file_name(&self) -> Result<String> {
        self.log_file
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::config(format!(
                "Log file path '{}' has no usable file name",
                self.log_file.display()
            )))
    }

    /// CSV header row
    pub fn csv_header(&self) -> Vec<String> {
        crate::defaults::CSV_HEADER.iter().map(|&s| s.to_string()).collect()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.log_file.as_os_str().is_empty() {
            return Err(AppError::config("Log file path cannot be empty"));
        }
        self.remote_file_name()?;

        if self.credentials_file.as_os_str().is_empty() {
            return Err(AppError::config("Credentials file path cannot be empty"));
        }

        if self.drive_folder.trim().is_empty() {
            return Err(AppError::config("Drive folder cannot be empty"));
        }

        if self.drive_folder.contains('\'') {
            return Err(AppError::config(format!("Drive folder ID contains a quote: {}", self.drive_folder)));
        }

        if self.speedtest_command.trim().is_empty() {
            return Err(AppError::config("Speed-test command cannot be empty"));
        }

        if let Some(timeout) = self.measurement_timeout_seconds {
            if timeout == 0 {
                return Err(AppError::config("Measurement timeout must be greater than 0"));
            }

            if timeout > crate::defaults::MAX_MEASUREMENT_TIMEOUT_SECS {
                return Err(AppError::config(format!(
                    "Measurement timeout cannot exceed {} seconds",
                    crate::defaults::MAX_MEASUREMENT_TIMEOUT_SECS
                )));
            }
        }

        if let Err(e) = url::Url::parse(&self.drive_api_base) {
            return Err(AppError::config(format!("Invalid Drive API base URL '{}': {}", self.drive_api_base, e)));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(log_file) = std::env::var("SPEEDTEST_LOG_FILE") {
            self.log_file = PathBuf::from(log_file);
        }

        if let Ok(credentials) = std::env::var("CREDENTIALS_FILE") {
            self.credentials_file = PathBuf::from(credentials);
        }

        if let Ok(secrets) = std::env::var("CLIENT_SECRETS_FILE") {
            self.client_secrets_file = PathBuf::from(secrets);
        }

        if let Ok(folder) = std::env::var("DRIVE_FOLDER") {
            self.drive_folder = folder.trim().to_string();
        }

        if let Ok(command) = std::env::var("SPEEDTEST_COMMAND") {
            self.speedtest_command = command.trim().to_string();
        }

        if let Ok(args) = std::env::var("SPEEDTEST_ARGS") {
            self.speedtest_args = args
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(timeout) = std::env::var("MEASUREMENT_TIMEOUT_SECONDS") {
            let timeout = timeout.trim();
            self.measurement_timeout_seconds = if timeout.is_empty() {
                None
            } else {
                Some(timeout.parse()
                    .map_err(|e| AppError::config(format!("Invalid MEASUREMENT_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?)
            };
        }

        if let Ok(upload) = std::env::var("UPLOAD_ENABLED") {
            self.upload_enabled = upload.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_ENABLED value '{}': {}", upload, e)))?;
        }

        if let Ok(base) = std::env::var("DRIVE_API_BASE") {
            self.drive_api_base = base.trim().trim_end_matches('/').to_string();
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_log_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_LOG_FILE)
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_CREDENTIALS_FILE)
}

fn default_client_secrets_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_CLIENT_SECRETS_FILE)
}

fn default_drive_folder() -> String {
    crate::defaults::DEFAULT_DRIVE_FOLDER.to_string()
}

fn default_speedtest_command() -> String {
    crate::defaults::DEFAULT_SPEEDTEST_COMMAND.to_string()
}

fn default_speedtest_args() -> Vec<String> {
    crate::defaults::DEFAULT_SPEEDTEST_ARGS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_upload_enabled() -> bool {
    crate::defaults::DEFAULT_UPLOAD_ENABLED
}

fn default_drive_api_base() -> String {
    crate::defaults::DRIVE_API_BASE.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
