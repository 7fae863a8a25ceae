//! Result types produced by the two pipelines.

use crate::error::ItemError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// The eight fields the model extracts from one résumé.
///
/// Every field defaults to the empty string, so a reply missing a key still
/// yields a complete row. Fields the model returns as lists, numbers or
/// nested objects are flattened to text rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub number: String,
    #[serde(deserialize_with = "lenient_text")]
    pub education: String,
    #[serde(deserialize_with = "lenient_text")]
    pub work_experience: String,
    #[serde(deserialize_with = "lenient_text")]
    pub projects: String,
    #[serde(deserialize_with = "lenient_text")]
    pub certifications: String,
    #[serde(deserialize_with = "lenient_text")]
    pub skills: String,
}

impl ResumeRecord {
    /// Field values in [`crate::prompts::RESUME_COLUMNS`] order, minus `filename`.
    pub fn values(&self) -> [&str; 8] {
        [
            &self.name,
            &self.email,
            &self.number,
            &self.education,
            &self.work_experience,
            &self.projects,
            &self.certifications,
            &self.skills,
        ]
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// Render an arbitrary JSON value as a CSV cell.
///
/// null → "", strings verbatim, arrays joined with "; ", objects as compact JSON.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => value.to_string(),
    }
}

/// Outcome of parsing a single résumé image.
///
/// Never an `Err` at the call site: failures are carried in `outcome` so the
/// batch can move on to the next file.
#[derive(Debug, Clone)]
pub struct ParsedResume {
    /// Base name of the image file.
    pub filename: String,
    pub outcome: Result<ResumeRecord, ItemError>,
}

impl ParsedResume {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn record(&self) -> Option<&ResumeRecord> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ItemError> {
        self.outcome.as_ref().err()
    }
}

/// A file that produced output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// The input file.
    pub source: PathBuf,
    /// Where its result went (JPEG path for the flattener, CSV path for the extractor).
    pub output: PathBuf,
    /// Extracted candidate name, for logs and `--json` output only.
    ///
    /// "Unknown" when the reply has no usable name: the `name` key is missing,
    /// null, or present but blank all count. The CSV `name` cell keeps the
    /// decoded value (empty in those cases). Always `None` for the flattener.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A file that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub source: PathBuf,
    /// Human-readable error, as printed during the run.
    pub error: String,
    /// Machine-readable cause.
    pub cause: ItemError,
}

/// Per-run counters and file lists. Lives for one batch; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub processed_files: Vec<ProcessedFile>,
    pub failed_files: Vec<FailedFile>,
}

impl BatchSummary {
    pub(crate) fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self, file: ProcessedFile) {
        self.successful += 1;
        self.processed_files.push(file);
    }

    pub(crate) fn record_failure(&mut self, source: PathBuf, cause: ItemError) {
        self.failed += 1;
        self.failed_files.push(FailedFile {
            source,
            error: cause.to_string(),
            cause,
        });
    }
}
