//! Image encoding: résumé image on disk → base64 PNG wrapped in `ImageData`.
//!
//! The file is decoded first rather than forwarded as raw bytes, so an
//! unreadable or mislabelled image fails here with a clear per-file error
//! instead of as an opaque provider rejection. PNG keeps text edges crisp.

use crate::error::ItemError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Open an image file and encode it for the VLM request.
pub fn load_image(path: &Path) -> Result<ImageData, ItemError> {
    let img = image::open(path).map_err(|e| ItemError::ImageOpenFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Opened {} → {}x{} px",
        path.display(),
        img.width(),
        img.height()
    );
    encode_image(&img).map_err(|e| ItemError::ImageOpenFailed {
        path: path.to_path_buf(),
        detail: format!("PNG encoding failed: {e}"),
    })
}

/// Encode an in-memory image as a base64 PNG ready for the VLM API.
///
/// `detail: "high"` asks tiling providers for full resolution; a stitched
/// multi-page résumé is tall and its small print is what we need.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
