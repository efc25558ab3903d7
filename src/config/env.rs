//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_LOG_FILE", "CSV log file to append to", "internet_speedtest.csv"),
            ("CREDENTIALS_FILE", "Stored Google Drive credentials", "mycreds.txt"),
            ("CLIENT_SECRETS_FILE", "OAuth client secrets for first-time authorization", "client_secrets.json"),
            ("DRIVE_FOLDER", "Drive folder ID to upload into", "root"),
            ("SPEEDTEST_COMMAND", "Speed-test utility to run", "speedtest-cli"),
            ("SPEEDTEST_ARGS", "Comma-separated arguments for the utility", "--simple"),
            ("MEASUREMENT_TIMEOUT_SECONDS", "Kill the speed test after N seconds", "unset (no timeout)"),
            ("UPLOAD_ENABLED", "Mirror the log to Google Drive", "true"),
            ("DRIVE_API_BASE", "Drive REST API base URL", "https://www.googleapis.com"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}
