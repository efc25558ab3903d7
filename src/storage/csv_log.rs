//! Append-or-create CSV log

use crate::error::{AppError, ErrorContext, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// What `CsvLogger::append` did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// File did not exist (or was empty); header and row written
    Created,
    /// Row appended to an existing log
    Appended,
}

/// Writes rows to a CSV file, emitting the header only when the file is new
#[derive(Debug, Clone)]
pub struct CsvLogger {
    path: PathBuf,
    header: Option<Vec<String>>,
}

impl CsvLogger {
    pub fn new(path: impl Into<PathBuf>, header: Option<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. No locking: concurrent writers may interleave.
    pub fn append(&self, record: &[String]) -> Result<AppendOutcome> {
        if let Some(header) = &self.header {
            if header.len() != record.len() {
                return Err(AppError::csv(format!(
                    "Record has {} fields but the header has {}",
                    record.len(),
                    header.len()
                )));
            }
        }

        // An empty file counts as new so the log always starts with the header
        let is_new = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let opened = if is_new {
            File::create(&self.path)
        } else {
            OpenOptions::new().append(true).open(&self.path)
        };
        let file = opened.with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if is_new {
            if let Some(header) = &self.header {
                writer.write_record(header)?;
            }
        }
        writer.write_record(record)?;
        writer.flush().with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(if is_new { AppendOutcome::Created } else { AppendOutcome::Appended })
    }
}
