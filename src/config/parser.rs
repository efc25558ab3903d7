//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref path) = self.cli.log_file {
            config.log_file = path.clone();
        }

        if let Some(ref path) = self.cli.credentials {
            config.credentials_file = path.clone();
        }

        if let Some(ref path) = self.cli.client_secrets {
            config.client_secrets_file = path.clone();
        }

        if let Some(ref folder) = self.cli.folder {
            config.drive_folder = folder.clone();
        }

        if let Some(ref command) = self.cli.speedtest_cmd {
            config.speedtest_command = command.clone();
        }

        if !self.cli.speedtest_args.is_empty() {
            config.speedtest_args = self.cli.speedtest_args.clone();
        }

        if self.cli.timeout.is_some() {
            config.measurement_timeout_seconds = self.cli.timeout;
        }

        if self.cli.no_upload {
            config.upload_enabled = false;
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let timeout = config
        .measurement_timeout_seconds
        .map(|secs| format!("{}s", secs))
        .unwrap_or_else(|| "none".to_string());

    let summary = [
        format!("Log File: {}", config.log_file.display()),
        format!("Credentials: {}", config.credentials_file.display()),
        format!("Client Secrets: {}", config.client_secrets_file.display()),
        format!("Drive Folder: {}", config.drive_folder),
        format!("Speed Test: {} {}", config.speedtest_command, config.speedtest_args.join(" ")),
        format!("Timeout: {}", timeout),
        format!("Upload: {}", config.upload_enabled),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
