//! Error types for the resume-vlm library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ResumeError`] — **Fatal**: the batch cannot proceed at all (unreadable
//!   input directory, pdfium missing, provider not configured, CSV not
//!   writable). Returned as `Err(ResumeError)` from the batch drivers.
//!
//! * [`ItemError`] — **Non-fatal**: a single PDF or image failed (zero pages,
//!   bad JSON from the model, network error) but every other file in the
//!   folder is still processed. Stored in [`crate::output::FailedFile`] and
//!   [`crate::output::ParsedResume`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume-vlm library.
#[derive(Debug, Error)]
pub enum ResumeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input directory exists but could not be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory (or the CSV's parent).
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not open, append to, or flush the CSV file.
    #[error("Failed to write output file '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide,\n\
or set PDFIUM_LIB_PATH to the directory that contains it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad category of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The input itself is unusable (e.g. a PDF with zero pages).
    InputValidation,
    /// The model replied, but not with a JSON object after fence stripping.
    Decode,
    /// Reading the file, rendering it, or talking to the model failed.
    ExternalService,
}

/// A non-fatal error for a single file in a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// Rendering produced no pages.
    #[error("No pages found in PDF: {path}")]
    NoPages { path: PathBuf },

    /// pdfium could not open the document or rasterise one of its pages.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The merged JPEG could not be written.
    #[error("Failed to save image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    /// The résumé image could not be opened or encoded.
    #[error("Error processing resume: cannot open image '{path}': {detail}")]
    ImageOpenFailed { path: PathBuf, detail: String },

    /// The model reply was not valid JSON once fences were removed.
    #[error("Failed to parse JSON response: {detail}")]
    JsonDecode { detail: String },

    /// The model call failed.
    #[error("Error processing resume: {detail}")]
    LlmFailed { detail: String },

    /// The model call exceeded the configured timeout.
    #[error("Error processing resume: model call timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl ItemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ItemError::NoPages { .. } => ErrorKind::InputValidation,
            ItemError::JsonDecode { .. } => ErrorKind::Decode,
            ItemError::RasterisationFailed { .. }
            | ItemError::ImageWriteFailed { .. }
            | ItemError::ImageOpenFailed { .. }
            | ItemError::LlmFailed { .. }
            | ItemError::Timeout { .. } => ErrorKind::ExternalService,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_is_input_validation() {
        let e = ItemError::NoPages {
            path: PathBuf::from("empty.pdf"),
        };
        assert_eq!(e.kind(), ErrorKind::InputValidation);
        assert!(e.to_string().contains("empty.pdf"), "got: {e}");
    }

    #[test]
    fn json_decode_display_keeps_prefix() {
        let e = ItemError::JsonDecode {
            detail: "expected value at line 1 column 1".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Decode);
        assert!(e.to_string().starts_with("Failed to parse JSON response:"));
    }

    #[test]
    fn llm_and_timeout_are_external() {
        let e = ItemError::LlmFailed {
            detail: "503 Service Unavailable".into(),
        };
        assert_eq!(e.kind(), ErrorKind::ExternalService);
        assert!(e.to_string().starts_with("Error processing resume:"));

        let t = ItemError::Timeout { secs: 30 };
        assert_eq!(t.kind(), ErrorKind::ExternalService);
        assert!(t.to_string().contains("30s"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = ResumeError::ProviderNotConfigured {
            provider: "gemini".into(),
            hint: "Set GEMINI_API_KEY".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gemini"));
        assert!(msg.contains("GEMINI_API_KEY"));
    }
}
