//! Append-only CSV log of rule evaluations.
//!
//! Whether a header is needed is decided by looking at the file on every
//! append (absent or zero length), never by in-memory state. This assumes a
//! single writer; two processes appending to the same path can race on the
//! header check and interleave rows.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{LogError, Result};
use crate::models::{Evaluation, LogRow};

pub const LOG_COLUMNS: [&str; 12] = [
    "timestamp",
    "student",
    "AttendanceRule",
    "AttendanceDetail",
    "GradingRule",
    "GradingDetail",
    "LoginSystemRule",
    "LoginDetail",
    "BonusPointsRule",
    "BonusDetail",
    "LibraryBorrowingRule",
    "LibraryDetail",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, student: &str, evaluation: &Evaluation) -> Result<()> {
        self.append_at(student, evaluation, Local::now().naive_local())
    }

    pub fn append_at(&self, student: &str, evaluation: &Evaluation, at: NaiveDateTime) -> Result<()> {
        let need_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if need_header {
            writer.write_record(LOG_COLUMNS)?;
        }

        let row = LogRow::from_evaluation(at.format(TIMESTAMP_FORMAT).to_string(), student, evaluation);
        writer.serialize(&row)?;
        writer.flush().map_err(|source| self.io_error(source))?;

        tracing::debug!(
            path = %self.path.display(),
            student,
            header = need_header,
            "appended evaluation row"
        );
        Ok(())
    }

    /// Appends a row, reporting any failure instead of returning it.
    pub fn record(&self, student: &str, evaluation: &Evaluation) -> bool {
        match self.append(student, evaluation) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    student,
                    error = %e,
                    "error writing to CSV"
                );
                false
            }
        }
    }

    /// Removes the log file. A log that does not exist yet is already reset.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "removed previous results log");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn read_rows(&self) -> Result<Vec<LogRow>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();

        for result in reader.deserialize::<LogRow>() {
            rows.push(result?);
        }

        Ok(rows)
    }

    fn io_error(&self, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
