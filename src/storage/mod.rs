//! Local persistence of measurement rows

pub mod csv_log;

pub use csv_log::{AppendOutcome, CsvLogger};
