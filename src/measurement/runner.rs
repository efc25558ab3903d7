//! Execution of the external speed-test utility

use crate::error::{AppError, Result};
use crate::models::Config;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Source of raw speed-test output
#[async_trait]
pub trait SpeedTestRunner: Send + Sync {
    /// Run one speed test and return its standard output
    async fn run(&self) -> Result<String>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Runs the utility as a child process
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Build the runner described by the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.speedtest_command.clone(), config.speedtest_args.clone())
            .with_timeout(config.measurement_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn execute(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::measurement(format!("Failed to run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(AppError::measurement(if stderr.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                format!("'{}' exited with {}: {}", self.program, output.status, stderr)
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SpeedTestRunner for CommandRunner {
    async fn run(&self) -> Result<String> {
        match self.timeout {
            Some(limit) => timeout(limit, self.execute())
                .await
                .map_err(|_| AppError::timeout(format!(
                    "'{}' did not finish within {}s",
                    self.program,
                    limit.as_secs()
                )))?,
            None => self.execute().await,
        }
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config {
            measurement_timeout_seconds: Some(30),
            ..Config::default()
        };
        let runner = CommandRunner::from_config(&config);

        assert_eq!(runner.describe(), "speedtest-cli --simple");
        assert_eq!(runner.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_missing_program_is_measurement_error() {
        let runner = CommandRunner::new("speedlog-definitely-not-installed", vec!["--simple".to_string()]);
        let error = runner.run().await.unwrap_err();

        assert_eq!(error.category(), "MEASURE");
        assert!(error.to_string().contains("speedlog-definitely-not-installed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = CommandRunner::new(
            "sh",
            vec!["-c".to_string(), "printf 'Ping: 12.3 ms\\nDownload: 45.6 Mbit/s\\n'".to_string()],
        );
        let output = runner.run().await.unwrap();

        assert_eq!(output, "Ping: 12.3 ms\nDownload: 45.6 Mbit/s\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_measurement_error() {
        let runner = CommandRunner::new(
            "sh",
            vec!["-c".to_string(), "echo 'Cannot retrieve configuration' >&2; exit 1".to_string()],
        );
        let error = runner.run().await.unwrap_err();

        assert_eq!(error.category(), "MEASURE");
        assert!(error.to_string().contains("Cannot retrieve configuration"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let runner = CommandRunner::new("sleep", vec!["5".to_string()])
            .with_timeout(Some(Duration::from_millis(200)));
        let error = runner.run().await.unwrap_err();

        assert_eq!(error.category(), "TIMEOUT");
    }
}
