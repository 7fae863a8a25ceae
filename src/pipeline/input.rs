//! Input discovery: list the files a batch will process.
//!
//! Listing is non-recursive and matches file-name suffixes case-sensitively,
//! so `CV.PDF` is not picked up by `.pdf`. Hidden files (leading `.`) are
//! always skipped, even when they match a suffix; this keeps macOS `._cv.pdf`
//! resource-fork companions out of a batch. Results are sorted by name within
//! each suffix so runs are reproducible. A missing directory is not an error:
//! it simply contains nothing to process.

use crate::error::ResumeError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// All `*.pdf` files directly inside `dir`, sorted by name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ResumeError> {
    list_with_suffixes(dir, &[".pdf"])
}

/// Files directly inside `dir` ending in any of `suffixes`.
///
/// Files are grouped by suffix in the order given, and a file is listed once
/// per matching suffix: passing `.jpg` twice lists every JPEG twice.
pub fn list_with_suffixes<S: AsRef<str>>(
    dir: &Path,
    suffixes: &[S],
) -> Result<Vec<PathBuf>, ResumeError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Input directory does not exist: {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ResumeError::InputDirUnreadable {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ResumeError::InputDirUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!("Skipping non-UTF-8 file name: {}", path.display());
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        candidates.push((name.to_string(), path));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut files = Vec::new();
    for suffix in suffixes {
        let suffix = suffix.as_ref();
        files.extend(
            candidates
                .iter()
                .filter(|(name, _)| name.ends_with(suffix))
                .map(|(_, path)| path.clone()),
        );
    }

    debug!("Found {} matching files in {}", files.len(), dir.display());
    Ok(files)
}
