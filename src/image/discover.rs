//! Input file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File extensions accepted as input, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff"];

/// Check whether a path has a supported image extension.
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// List the supported image files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into, so a default `output` directory
/// nested in the input directory is never picked up.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let entries = fs::read_dir(dir).map_err(|source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_supported(&path) {
            images.push(path);
        }
    }

    images.sort();
    tracing::debug!("Found {} image(s) in {}", images.len(), dir.display());

    Ok(images)
}
