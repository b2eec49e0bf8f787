//! Monocular depth estimation with Depth Anything V2.

use std::path::Path;

use image::{imageops::FilterType, GrayImage, ImageBuffer, Luma, RgbImage};
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::image::image_to_tensor;
use crate::model::{load_session, Device};

/// Side length the model is trained at.
const MODEL_INPUT_SIZE: f64 = 518.0;

/// Model input sides must be multiples of the ViT patch size.
const PATCH_SIZE: f64 = 14.0;

/// Produces a per-pixel depth map for a photograph.
pub trait DepthEstimator {
    /// Estimate depth for `image`.
    ///
    /// The returned map has the same dimensions as `image`, with brighter
    /// pixels for larger model responses (nearer surfaces for relative
    /// inverse-depth models).
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn estimate(&mut self, image: &RgbImage) -> Result<GrayImage>;
}

/// Depth Anything V2 running on ONNX Runtime.
pub struct DepthAnything {
    session: Session,
}

impl DepthAnything {
    /// Load the model from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn load(path: &Path, device: Device) -> Result<Self> {
        let session = load_session(path, device)?;
        Ok(Self { session })
    }

    /// Run the network and return the raw prediction with its (width, height).
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn predict(&mut self, image: &RgbImage) -> Result<(Vec<f32>, u32, u32)> {
        let (width, height) = model_input_size(image.width(), image.height());
        tracing::debug!(
            "Running depth model at {width}x{height} for {}x{} input",
            image.width(),
            image.height()
        );

        let input = image_to_tensor(image, width, height);
        let input_value = Tensor::from_array(input).map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "predicted_depth output".to_string(),
                actual: "no output".to_string(),
            })?;

        let (shape_info, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|source| Error::Inference { source })?;

        // Safe: tensor dimensions are always non-negative and within bounds
        let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();
        let (out_w, out_h) = depth_dims(&dims, data.len())?;

        Ok((data.to_vec(), out_w, out_h))
    }
}

impl DepthEstimator for DepthAnything {
    fn estimate(&mut self, image: &RgbImage) -> Result<GrayImage> {
        let (raw, width, height) = self.predict(image)?;
        let normalized = normalize_depth(&raw, width, height)?;

        Ok(upsample_depth(&normalized, image.width(), image.height()))
    }
}

/// Validate a prediction shape and return its (width, height).
///
/// Accepts `[1, H, W]` and `[1, 1, H, W]` holding exactly `H * W` values.
///
/// # Errors
///
/// Returns an error for any other shape or a mismatched value count.
pub fn depth_dims(dims: &[usize], len: usize) -> Result<(u32, u32)> {
    let (height, width) = match dims {
        [1, h, w] | [1, 1, h, w] => (*h, *w),
        _ => {
            return Err(Error::ShapeMismatch {
                expected: "[1, H, W] or [1, 1, H, W]".to_string(),
                actual: format!("{dims:?}"),
            })
        }
    };

    if len != height * width {
        return Err(Error::ShapeMismatch {
            expected: format!("{} values", height * width),
            actual: format!("{len} values"),
        });
    }

    let to_u32 = |side: usize| {
        u32::try_from(side).map_err(|_| Error::ShapeMismatch {
            expected: "side length within u32".to_string(),
            actual: side.to_string(),
        })
    };

    Ok((to_u32(width)?, to_u32(height)?))
}

/// Compute the model input size for an image of `width` x `height`.
///
/// Keeps the aspect ratio, scaling by whichever of the height or width factor
/// toward 518 is closer to 1, then snaps each side to the nearest multiple of
/// the patch size.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn model_input_size(width: u32, height: u32) -> (u32, u32) {
    let scale_height = MODEL_INPUT_SIZE / f64::from(height.max(1));
    let scale_width = MODEL_INPUT_SIZE / f64::from(width.max(1));

    let scale = if (1.0 - scale_width).abs() < (1.0 - scale_height).abs() {
        scale_width
    } else {
        scale_height
    };

    let snap = |side: u32| {
        let snapped = (f64::from(side) * scale / PATCH_SIZE).round() * PATCH_SIZE;
        // Safe: bounded below by one patch and far below u32::MAX
        snapped.max(PATCH_SIZE) as u32
    };

    (snap(width), snap(height))
}

/// Min-max normalize a raw prediction into 16-bit luminance.
///
/// A constant prediction maps to all zeros.
///
/// # Errors
///
/// Returns an error if `raw` does not hold `width * height` values.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize_depth(
    raw: &[f32],
    width: u32,
    height: u32,
) -> Result<ImageBuffer<Luma<u16>, Vec<u16>>> {
    let (min, max) = raw
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let scaled = raw
        .iter()
        .map(|&v| {
            if range > 0.0 && v.is_finite() {
                // Safe: clamped to [0, 65535] before casting
                (((v - min) / range) * f32::from(u16::MAX))
                    .round()
                    .clamp(0.0, f32::from(u16::MAX)) as u16
            } else {
                0
            }
        })
        .collect();

    ImageBuffer::from_raw(width, height, scaled).ok_or_else(|| Error::ShapeMismatch {
        expected: format!("{width}x{height} depth values"),
        actual: format!("{} values", raw.len()),
    })
}

/// Resize a normalized depth map to the photo's size and quantize to 8 bits.
///
/// Normalization happens before upsampling, so bicubic overshoot at sharp
/// depth edges is clipped to the [0, 1] range rather than stretching the
/// range of the whole map. Quantization rounds to the nearest level.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn upsample_depth(
    depth: &ImageBuffer<Luma<u16>, Vec<u16>>,
    width: u32,
    height: u32,
) -> GrayImage {
    let resized = if depth.dimensions() == (width, height) {
        depth.clone()
    } else {
        image::imageops::resize(depth, width, height, FilterType::CatmullRom)
    };

    GrayImage::from_fn(width, height, |x, y| {
        let value = u32::from(resized.get_pixel(x, y)[0]);
        // Safe: value <= 65535, so the quotient is <= 255
        Luma([((value * 255 + 32_767) / 65_535) as u8])
    })
}
