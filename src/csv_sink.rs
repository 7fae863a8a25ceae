//! Append-only CSV output for résumé records.
//!
//! The header is decided once, in [`CsvSink::open`]: it is written when the
//! file is missing or empty at that moment, and never again during the run.
//! Each appended row is flushed immediately so rows already written survive
//! a crash or a later fatal error.
//!
//! There is no file locking; two processes appending to the same path will
//! interleave rows.

use crate::error::ResumeError;
use crate::output::ResumeRecord;
use crate::prompts::RESUME_COLUMNS;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open CSV file receiving one row per parsed résumé.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Open `path` for appending, creating parent directories and writing the
    /// header if the file is new or empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ResumeError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ResumeError::OutputDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_failed(&path, e))?;
        let needs_header = file.metadata().map_err(|e| write_failed(&path, e))?.len() == 0;

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        let mut sink = Self { path, writer };

        if needs_header {
            debug!("Writing CSV header to {}", sink.path.display());
            sink.write_row(RESUME_COLUMNS)?;
        }
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row: `filename` followed by the record's fields in column order.
    pub fn append(&mut self, filename: &str, record: &ResumeRecord) -> Result<(), ResumeError> {
        let values = record.values();
        let mut row = Vec::with_capacity(RESUME_COLUMNS.len());
        row.push(filename);
        row.extend_from_slice(&values);
        self.write_row(row)
    }

    fn write_row<I, T>(&mut self, row: I) -> Result<(), ResumeError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(row)
            .map_err(|e| write_failed(&self.path, e))?;
        self.writer.flush().map_err(|e| write_failed(&self.path, e))
    }
}

fn write_failed(path: &Path, e: impl std::fmt::Display) -> ResumeError {
    ResumeError::OutputWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}
