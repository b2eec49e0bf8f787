//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, RgbImage};
use ndarray::Array4;

use crate::error::{Error, Result};

use super::{ImageTensor, IMAGENET_MEAN, IMAGENET_STD, RGB_CHANNELS};

/// Load an image from disk as 8-bit RGB.
///
/// Alpha channels are dropped and grayscale images are expanded, so every
/// supported input ends up with the same pixel layout.
///
/// # Errors
///
/// Returns an error if the image cannot be opened or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(img.into_rgb8())
}

/// Convert an RGB image to a normalized NCHW tensor of the given size.
///
/// The image is:
/// 1. Resized to `width` x `height` with a bicubic filter
/// 2. Scaled from [0, 255] to [0, 1]
/// 3. Normalized with the ImageNet mean and standard deviation
/// 4. Returned as NCHW tensor (1, 3, height, width)
#[must_use]
pub fn image_to_tensor(img: &RgbImage, width: u32, height: u32) -> ImageTensor {
    let resized = if img.dimensions() == (width, height) {
        img.clone()
    } else {
        image::imageops::resize(img, width, height, FilterType::CatmullRom)
    };

    let mut tensor = Array4::<f32>::zeros((1, RGB_CHANNELS, height as usize, width as usize));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..RGB_CHANNELS {
            let value = f32::from(pixel[c]) / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (value - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_tensor_shape() {
        let img = RgbImage::new(100, 60);
        let tensor = image_to_tensor(&img, 28, 14);

        assert_eq!(tensor.shape(), &[1, 3, 14, 28]);
    }

    #[test]
    fn test_normalization_black() {
        let img = RgbImage::new(14, 14);
        let tensor = image_to_tensor(&img, 14, 14);

        for c in 0..RGB_CHANNELS {
            let expected = -IMAGENET_MEAN[c] / IMAGENET_STD[c];
            assert!((tensor[[0, c, 3, 5]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normalization_white() {
        let img = RgbImage::from_pixel(14, 14, Rgb([255, 255, 255]));
        let tensor = image_to_tensor(&img, 14, 14);

        for c in 0..RGB_CHANNELS {
            let expected = (1.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            assert!((tensor[[0, c, 0, 0]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_load_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]))
            .save(&path)
            .unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(load_image(&path), Err(Error::ImageLoad { .. })));
    }
}
