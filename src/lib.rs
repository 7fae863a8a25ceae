//! # resume-vlm
//!
//! Turn a folder of PDF résumés into a CSV of structured candidate fields,
//! using a Vision Language Model (VLM) to read each résumé.
//!
//! ## Two pipelines
//!
//! ```text
//! PDF Flattener                         Resume Extractor
//!  pdfs/*.pdf                            resumes/*.{jpg,jpeg,png}
//!   │                                     │
//!   ├─ render  every page at DPI          ├─ encode  image → base64 PNG
//!   ├─ merge   stack pages vertically     ├─ VLM     fixed prompt + image
//!   └─ save    resumes/<stem>.jpg ──────▶ ├─ parse   strip fences, JSON, phone cleanup
//!                                         └─ append  one CSV row per résumé
//! ```
//!
//! The pipelines share no state; the flattener's output directory is simply
//! the extractor's input folder. Both process files one at a time and treat a
//! failing file as a recorded outcome, not a reason to stop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_vlm::{flatten_folder, ExtractConfig, FlattenConfig, ResumeExtractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let flatten = FlattenConfig::builder()
//!         .input_dir("pdfs")
//!         .output_dir("resumes")
//!         .build()?;
//!     flatten_folder(&flatten).await?;
//!
//!     // Provider key comes from GEMINI_API_KEY
//!     let config = ExtractConfig::builder().csv_path("output/resumes.csv").build()?;
//!     let mut extractor = ResumeExtractor::new(config)?;
//!     let summary = extractor.process_resume_folder("resumes").await?;
//!     eprintln!("{} ok, {} failed", summary.successful, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpg` and `resume2csv` binaries (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! The flattener needs a pdfium shared library at runtime: next to the
//! binary, on the system library path, or in `PDFIUM_LIB_PATH`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod csv_sink;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder, FlattenConfig, FlattenConfigBuilder};
pub use csv_sink::CsvSink;
pub use error::{ErrorKind, ItemError, ResumeError};
pub use extract::ResumeExtractor;
pub use flatten::{flatten_folder, flatten_pdf};
pub use output::{BatchSummary, FailedFile, ParsedResume, ProcessedFile, ResumeRecord};
pub use pipeline::llm::{ProviderModel, VisionModel};
pub use pipeline::postprocess::format_number;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::{RESUME_COLUMNS, RESUME_EXTRACTION_PROMPT};
