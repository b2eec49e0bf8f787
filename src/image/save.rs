//! Image saving utilities.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{Error, Result};

use super::SizeLabel;

/// Save an image as lossy WEBP.
///
/// WEBP has no single-channel mode, so grayscale images are written with
/// identical R, G and B values. Alpha is discarded.
///
/// # Arguments
///
/// * `img` - Image to encode
/// * `path` - Output file path
/// * `quality` - WEBP quality (1-100)
///
/// # Errors
///
/// Returns an error if the quality is out of range, encoding fails, or the
/// file cannot be written.
pub fn save_webp<P: AsRef<Path>>(img: &DynamicImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    if !(1..=100).contains(&quality) {
        return Err(Error::InvalidParameter {
            name: "quality".to_string(),
            reason: "must be between 1 and 100".to_string(),
        });
    }

    let rgb = match img {
        DynamicImage::ImageRgb8(rgb) => Cow::Borrowed(rgb),
        other => Cow::Owned(other.to_rgb8()),
    };

    let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
    let encoded = encoder
        .encode_simple(false, f32::from(quality))
        .map_err(|err| Error::ImageEncode {
            path: path.to_path_buf(),
            reason: format!("{err:?}"),
        })?;

    fs::write(path, &*encoded)?;

    Ok(())
}

/// Build the photo and depth output paths for an input stem and size label.
///
/// Returns `(<stem>-<label>.webp, <stem>-<label>-depth.webp)` inside `output_dir`.
#[must_use]
pub fn output_paths(output_dir: &Path, stem: &str, label: SizeLabel) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{stem}-{label}.webp")),
        output_dir.join(format!("{stem}-{label}-depth.webp")),
    )
}
