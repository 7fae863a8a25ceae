//! PDF Flattener: one tall JPEG per PDF.
//!
//! Every PDF in the input directory is rendered page by page, the pages are
//! stacked top to bottom on a white canvas, and the result is saved as
//! `<output_dir>/<stem>.jpg`. Existing JPEGs with the same name are replaced.
//! A failing PDF is logged and recorded; the rest of the batch continues.

use crate::config::FlattenConfig;
use crate::error::{ItemError, ResumeError};
use crate::output::{BatchSummary, ProcessedFile};
use crate::pipeline::{input, render};
use image::RgbImage;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Render one PDF and stack its pages into a single RGB image.
///
/// # Errors
/// [`ItemError::NoPages`] when the document has no pages, or
/// [`ItemError::RasterisationFailed`] when pdfium cannot open or draw it.
pub fn flatten_pdf(
    pdfium: &Pdfium,
    pdf_path: &Path,
    config: &FlattenConfig,
) -> Result<RgbImage, ItemError> {
    let pages = render::render_pages(pdfium, pdf_path, config.dpi, config.max_page_pixels)?;
    render::merge_pages(&pages).ok_or_else(|| ItemError::NoPages {
        path: pdf_path.to_path_buf(),
    })
}

/// Where `flatten_folder` writes the image for `pdf_path`.
pub fn output_path_for(pdf_path: &Path, output_dir: &Path) -> PathBuf {
    let mut name = pdf_path
        .file_stem()
        .unwrap_or(pdf_path.as_os_str())
        .to_os_string();
    name.push(".jpg");
    output_dir.join(name)
}

/// Flatten every `*.pdf` in `config.input_dir` into `config.output_dir`.
///
/// pdfium is bound once and the whole batch runs on a blocking worker
/// thread, one document at a time.
///
/// # Errors
/// Only fatal conditions: the output directory cannot be created, the input
/// directory cannot be listed, or pdfium cannot be loaded. Per-file failures
/// are reported in the returned [`BatchSummary`].
pub async fn flatten_folder(config: &FlattenConfig) -> Result<BatchSummary, ResumeError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || flatten_folder_blocking(&config))
        .await
        .map_err(|e| ResumeError::Internal(format!("Flatten task panicked: {}", e)))?
}

fn flatten_folder_blocking(config: &FlattenConfig) -> Result<BatchSummary, ResumeError> {
    let batch_start = Instant::now();

    std::fs::create_dir_all(&config.output_dir).map_err(|e| ResumeError::OutputDirFailed {
        path: config.output_dir.clone(),
        source: e,
    })?;

    let pdf_files = input::list_pdfs(&config.input_dir)?;
    let total = pdf_files.len();
    let mut summary = BatchSummary::with_total(total);
    if pdf_files.is_empty() {
        info!("No PDF files found.");
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(0);
            cb.on_batch_complete(0, 0);
        }
        return Ok(summary);
    }

    let pdfium = render::bind_pdfium(config.pdfium_lib_path.as_deref())?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    for (idx, pdf_path) in pdf_files.into_iter().enumerate() {
        let index = idx + 1;
        let name = display_name(&pdf_path);
        info!("Processing: {}", name);
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &name);
        }

        let output_path = output_path_for(&pdf_path, &config.output_dir);
        let result = flatten_pdf(&pdfium, &pdf_path, config)
            .and_then(|merged| render::save_jpeg(&merged, &output_path, config.jpeg_quality));

        match result {
            Ok(()) => {
                info!("Saved: {}", output_path.display());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_complete(index, total, &name, &output_path.display().to_string());
                }
                summary.record_success(ProcessedFile {
                    source: pdf_path,
                    output: output_path,
                    name: None,
                });
            }
            Err(e) => {
                warn!("Failed to process {}: {}", name, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_error(index, total, &name, &e.to_string());
                }
                summary.record_failure(pdf_path, e);
            }
        }
    }

    info!(
        "Flattened {}/{} PDFs in {}ms",
        summary.successful,
        total,
        batch_start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, summary.successful);
    }

    Ok(summary)
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
