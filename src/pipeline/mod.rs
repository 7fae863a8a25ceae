//! Pipeline stages shared by the flattener and the extractor.
//!
//! ## Data Flow
//!
//! ```text
//! Flattener:  input ──▶ render (pdfium, merge, JPEG)
//! Extractor:  input ──▶ encode ──▶ llm ──▶ postprocess ──▶ CSV
//!             (list)    (base64)   (VLM)   (fences, JSON, phone)
//! ```
//!
//! 1. [`input`]  — list `*.pdf` or image files in a directory
//! 2. [`render`] — rasterise pages, stitch them, write the JPEG; blocking
//! 3. [`encode`] — open a résumé image and base64-wrap it for the request
//! 4. [`llm`]    — the [`llm::VisionModel`] seam; the only stage with network I/O
//! 5. [`postprocess`] — fence stripping, lenient decoding, phone normalisation

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod render;
