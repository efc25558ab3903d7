//! Error handling for the speedtest logger

use thiserror::Error;

/// Custom error types for the speedtest logger
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speed-test utility could not be run or exited unsuccessfully
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Parsing errors (speedtest output, JSON, URLs, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV log errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Authentication/authorization errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Remote storage API errors
    #[error("Cloud storage error: {0}")]
    CloudStorage(String),

    /// HTTP transport errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new measurement error
    pub fn measurement<S: Into<String>>(message: S) -> Self {
        Self::Measurement(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new CSV error
    pub fn csv<S: Into<String>>(message: S) -> Self {
        Self::Csv(message.into())
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    /// Create a new cloud storage error
    pub fn cloud_storage<S: Into<String>>(message: S) -> Self {
        Self::CloudStorage(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Measurement(_) => "MEASURE",
            Self::Parse(_) => "PARSE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Csv(_) => "CSV",
            Self::Auth(_) => "AUTH",
            Self::CloudStorage(_) => "CLOUD",
            Self::HttpRequest(_) => "HTTP",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if the error is transient (running again later may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Measurement(_) | Self::Timeout(_) | Self::HttpRequest(_) | Self::CloudStorage(_) => true,
            Self::Config(_) | Self::Parse(_) | Self::Auth(_) => false,
            Self::Io(_) | Self::Csv(_) | Self::Internal(_) => false,
        }
    }

    /// One-line hint printed under the error by the binary
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check your .env file, environment variables and command line arguments.",
            Self::Measurement(_) => "Make sure speedtest-cli is installed and on your PATH.",
            Self::Parse(_) => "Check that the speed-test utility supports --simple output.",
            Self::Timeout(_) => "Increase the value passed to --timeout, or check your connection.",
            Self::Io(_) | Self::Csv(_) => "Check that the log file directory exists and is writable.",
            Self::Auth(_) => "The row was logged locally. Check --client-secrets, or delete the stored credentials file to authorize again.",
            Self::CloudStorage(_) => "Verify the Drive folder ID (--folder), or run with --no-upload to log locally only.",
            Self::HttpRequest(_) => "Check your internet connection, or run with --no-upload to log locally only.",
            Self::Internal(_) => "This is likely a bug. Please report it with the error details.",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::HttpRequest(_) | Self::CloudStorage(_) => 2,  // Network/remote issues
            Self::Timeout(_) => 3,
            Self::Auth(_) => 4,
            Self::Io(_) | Self::Csv(_) => 5,  // Local file issues
            Self::Measurement(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::HttpRequest(_) | Self::CloudStorage(_) | Self::Measurement(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Auth(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) | Self::Csv(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::csv(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_status() {
            Self::cloud_storage(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its category
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                AppError::Config(msg) => AppError::Config(format!("{}: {}", context, msg)),
                AppError::Measurement(msg) => AppError::Measurement(format!("{}: {}", context, msg)),
                AppError::Parse(msg) => AppError::Parse(format!("{}: {}", context, msg)),
                AppError::Timeout(msg) => AppError::Timeout(format!("{}: {}", context, msg)),
                AppError::Io(msg) => AppError::Io(format!("{}: {}", context, msg)),
                AppError::Csv(msg) => AppError::Csv(format!("{}: {}", context, msg)),
                AppError::Auth(msg) => AppError::Auth(format!("{}: {}", context, msg)),
                AppError::CloudStorage(msg) => AppError::CloudStorage(format!("{}: {}", context, msg)),
                AppError::HttpRequest(msg) => AppError::HttpRequest(format!("{}: {}", context, msg)),
                AppError::Internal(msg) => AppError::Internal(format!("{}: {}", context, msg)),
            }
        })
    }
}
