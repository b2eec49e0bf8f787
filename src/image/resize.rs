//! Fixed-width output variants.

use std::fmt;

use image::{imageops::FilterType, ImageBuffer, Pixel};

/// Output size variants, each bounded by a maximum width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeLabel {
    /// Thumbnail, at most 400 px wide.
    Thumb,
    /// Medium, at most 1200 px wide.
    Medium,
    /// Full resolution, at most 2400 px wide.
    Full,
}

impl SizeLabel {
    /// All labels in output order.
    pub const ALL: [Self; 3] = [Self::Thumb, Self::Medium, Self::Full];

    /// Maximum output width in pixels.
    #[must_use]
    pub const fn max_width(self) -> u32 {
        match self {
            Self::Thumb => 400,
            Self::Medium => 1200,
            Self::Full => 2400,
        }
    }

    /// Label used in output file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Medium => "medium",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute output dimensions for an image bounded by `max_width`.
///
/// Images already at or below the bound keep their size. Wider images are
/// scaled to exactly `max_width`, with the height truncated and kept at one
/// pixel minimum.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }

    // Safe: max_width < width, so the result is below height
    let new_height = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
    (max_width, new_height.max(1))
}

/// Resize an image so its width does not exceed `max_width`.
///
/// Uses Lanczos3. Returns an unmodified copy when no resize is needed.
#[must_use]
pub fn resize_to_width<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    max_width: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (width, height) = img.dimensions();
    let (new_width, new_height) = target_dimensions(width, height, max_width);

    if (new_width, new_height) == (width, height) {
        return img.clone();
    }

    image::imageops::resize(img, new_width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn test_labels() {
        let widths: Vec<_> = SizeLabel::ALL.iter().map(|l| l.max_width()).collect();
        assert_eq!(widths, [400, 1200, 2400]);
        assert_eq!(SizeLabel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_no_upscale() {
        assert_eq!(target_dimensions(300, 200, 400), (300, 200));
        assert_eq!(target_dimensions(400, 200, 400), (400, 200));
    }

    #[test]
    fn test_downscale_preserves_aspect() {
        assert_eq!(target_dimensions(4000, 3000, 400), (400, 300));
        assert_eq!(target_dimensions(3000, 4000, 1200), (1200, 1600));
        // Truncates like integer conversion: 1000 * 400 / 3000 = 133.33
        assert_eq!(target_dimensions(3000, 1000, 400), (400, 133));
    }

    #[test]
    fn test_extreme_panorama_keeps_one_row() {
        assert_eq!(target_dimensions(10_000, 3, 400), (400, 1));
    }

    #[test]
    fn test_resize_rgb_and_gray_match() {
        let photo = RgbImage::new(800, 600);
        let depth = GrayImage::new(800, 600);

        let small_photo = resize_to_width(&photo, 400);
        let small_depth = resize_to_width(&depth, 400);

        assert_eq!(small_photo.dimensions(), (400, 300));
        assert_eq!(small_depth.dimensions(), small_photo.dimensions());
    }

    #[test]
    fn test_resize_noop_for_small_images() {
        let photo = RgbImage::from_pixel(120, 80, image::Rgb([1, 2, 3]));
        let out = resize_to_width(&photo, SizeLabel::Full.max_width());

        assert_eq!(out, photo);
    }
}
