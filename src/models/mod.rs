//! Data models and structures for the speedtest logger

pub mod config;
pub mod measurement;

// Re-export main model types
pub use config::Config;
pub use measurement::MeasurementResult;
