//! PDF rasterisation and page stitching.
//!
//! pdfium is a blocking C++ library with thread-local state, so everything in
//! this module is synchronous; [`crate::flatten`] runs it inside
//! `tokio::task::spawn_blocking`.
//!
//! Stitching is two-pass: [`layout_pages`] measures every page first, the
//! canvas is allocated once at its final size, then pages are pasted top to
//! bottom at x = 0. Pages narrower than the widest one leave white margin on
//! the right.

use crate::error::{ItemError, ResumeError};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, Rgb, RgbImage};
use pdfium_render::prelude::*;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// PDF user space is 72 points per inch.
const POINTS_PER_INCH: f32 = 72.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Bind to a pdfium shared library.
///
/// With `lib_dir`, only that directory is tried. Otherwise the working
/// directory is tried first, then the system library search path.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, ResumeError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ResumeError::PdfiumBindingFailed(format!("{:?}", e)))?;

    debug!("pdfium bound");
    Ok(Pdfium::new(bindings))
}

/// Rasterise every page of a PDF at `dpi`, in document order.
///
/// `max_pixels` optionally caps both edges of each rendered page.
pub fn render_pages(
    pdfium: &Pdfium,
    pdf_path: &Path,
    dpi: u32,
    max_pixels: Option<u32>,
) -> Result<Vec<DynamicImage>, ItemError> {
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| ItemError::RasterisationFailed {
            page: 0,
            detail: format!("cannot open '{}': {:?}", pdf_path.display(), e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);
    if let Some(px) = max_pixels {
        render_config = render_config
            .set_maximum_width(px as i32)
            .set_maximum_height(px as i32);
    }

    let mut images = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ItemError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}

/// Final canvas size and the vertical offset of each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    /// `offsets[k]` is the sum of the heights of pages `0..k`.
    pub offsets: Vec<u32>,
}

/// Measure pages given as `(width, height)`. Returns `None` for no pages.
pub fn layout_pages(sizes: &[(u32, u32)]) -> Option<PageLayout> {
    let width = sizes.iter().map(|&(w, _)| w).max()?;

    let mut offsets = Vec::with_capacity(sizes.len());
    let mut height = 0u32;
    for &(_, h) in sizes {
        offsets.push(height);
        height += h;
    }

    Some(PageLayout {
        width,
        height,
        offsets,
    })
}

/// Stack pages vertically on a white RGB canvas. Returns `None` for no pages.
pub fn merge_pages(pages: &[DynamicImage]) -> Option<RgbImage> {
    let sizes: Vec<(u32, u32)> = pages.iter().map(|p| (p.width(), p.height())).collect();
    let layout = layout_pages(&sizes)?;

    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, WHITE);
    for (page, &y) in pages.iter().zip(&layout.offsets) {
        imageops::replace(&mut canvas, &page.to_rgb8(), 0, i64::from(y));
    }

    debug!(
        "Merged {} pages → {}x{} px",
        pages.len(),
        layout.width,
        layout.height
    );
    Some(canvas)
}

/// Write `image` as a JPEG at `path`, replacing any existing file.
///
/// The bytes go to a temporary file in the same directory and are renamed
/// into place, so a failed or interrupted write never leaves a truncated JPEG
/// or a stray temporary file behind.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<(), ItemError> {
    let write_err = |detail: String| ItemError::ImageWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode_image(image)
            .map_err(|e| write_err(e.to_string()))?;
        writer.flush().map_err(|e| write_err(e.to_string()))?;
    }

    // Dropping `tmp` on any error above deletes it.
    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;
    Ok(())
}
