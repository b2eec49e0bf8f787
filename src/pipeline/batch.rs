//! Batch driver turning a directory of photos into sized variants.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::image::{
    discover_images, load_image, output_paths, resize_to_width, save_webp, SizeLabel,
};
use crate::model::{Device, ModelCache, ModelKind};

use super::depth::{DepthAnything, DepthEstimator};

/// Name of the output directory created inside the input directory by default.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "output";

/// Configuration for the batch pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output directory. `None` writes to `<input>/output`.
    pub output_dir: Option<PathBuf>,

    /// WEBP quality for resized photos (1-100).
    pub photo_quality: u8,

    /// WEBP quality for depth maps (1-100).
    pub depth_quality: u8,

    /// Compute device for inference.
    pub device: Device,

    /// Local ONNX model. `None` uses the cached download.
    pub model_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            photo_quality: 85,
            depth_quality: 80,
            device: Device::Auto,
            model_path: None,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        for (name, quality) in [
            ("photo_quality", self.photo_quality),
            ("depth_quality", self.depth_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(Error::InvalidParameter {
                    name: name.to_string(),
                    reason: "must be between 1 and 100".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolve the output directory for a given input directory.
    #[must_use]
    pub fn output_dir_for(&self, input_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| input_dir.join(DEFAULT_OUTPUT_SUBDIR))
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Directory the outputs were written to.
    pub output_dir: PathBuf,

    /// Number of input images processed.
    pub images: usize,

    /// Every file written, in order.
    pub outputs: Vec<PathBuf>,
}

/// Batch pipeline producing photo and depth variants.
pub struct Pipeline<E = DepthAnything> {
    config: Config,
    estimator: E,
}

impl Pipeline<DepthAnything> {
    /// Create a new pipeline backed by Depth Anything V2.
    ///
    /// This will download the model if it is not already cached and no
    /// local model path was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the model cannot be loaded.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing pipeline with config: {config:?}");

        let model_path = match &config.model_path {
            Some(path) => path.clone(),
            None => ModelCache::new()?.get_model_path(ModelKind::DepthAnythingV2Small)?,
        };

        tracing::info!("Loading depth model from {}...", model_path.display());
        let estimator = DepthAnything::load(&model_path, config.device)?;

        tracing::info!("Pipeline initialized successfully");

        Ok(Self { config, estimator })
    }
}

impl<E: DepthEstimator> Pipeline<E> {
    /// Create a pipeline around an existing depth estimator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_estimator(config: Config, estimator: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, estimator })
    }

    /// Process every supported image in `input_dir`.
    ///
    /// The output directory is created up front. Images are processed in
    /// sorted order and the first failure stops the batch. Inputs sharing a
    /// stem write to the same output names, so the later one wins and each
    /// path is listed once in the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created, the input
    /// directory cannot be read, or any image fails to process.
    pub fn process_directory<P: AsRef<Path>>(&mut self, input_dir: P) -> Result<Summary> {
        let input_dir = input_dir.as_ref();
        let output_dir = self.config.output_dir_for(input_dir);

        fs::create_dir_all(&output_dir)?;

        let images = discover_images(input_dir)?;
        let mut summary = Summary {
            output_dir: output_dir.clone(),
            ..Summary::default()
        };

        if images.is_empty() {
            tracing::warn!("No images found in {}", input_dir.display());
            return Ok(summary);
        }

        let pb = ProgressBar::new(images.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Processing [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("valid template")
                .progress_chars("#>-"),
        );

        let mut stems = HashSet::new();
        let mut seen = HashSet::new();

        for path in &images {
            if let Some(stem) = path.file_stem() {
                if !stems.insert(stem.to_os_string()) {
                    tracing::warn!(
                        "{} shares its name with an earlier image, overwriting its outputs",
                        path.display()
                    );
                }
            }

            let written = self.process_image(path, &output_dir)?;
            for output in written {
                if seen.insert(output.clone()) {
                    summary.outputs.push(output);
                }
            }
            summary.images += 1;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(summary)
    }

    /// Produce the photo and depth variants of one image.
    ///
    /// Writes `<stem>-<label>.webp` and `<stem>-<label>-depth.webp` for every
    /// size label and returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded, depth estimation fails,
    /// or an output cannot be written.
    pub fn process_image(&mut self, path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!("Processing {name}...");

        let photo = load_image(path)?;
        let depth = self.estimator.estimate(&photo)?;

        if depth.dimensions() != photo.dimensions() {
            return Err(Error::ShapeMismatch {
                expected: format!("{}x{} depth map", photo.width(), photo.height()),
                actual: format!("{}x{}", depth.width(), depth.height()),
            });
        }

        let mut written = Vec::with_capacity(SizeLabel::ALL.len() * 2);

        for label in SizeLabel::ALL {
            let max_width = label.max_width();
            let (photo_path, depth_path) = output_paths(output_dir, &stem, label);

            let resized = DynamicImage::ImageRgb8(resize_to_width(&photo, max_width));
            save_webp(&resized, &photo_path, self.config.photo_quality)?;

            let depth_resized = DynamicImage::ImageLuma8(resize_to_width(&depth, max_width));
            save_webp(&depth_resized, &depth_path, self.config.depth_quality)?;

            tracing::info!(
                "{label}: {}, {}",
                display_name(&photo_path),
                display_name(&depth_path)
            );

            written.push(photo_path);
            written.push(depth_path);
        }

        Ok(written)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    struct FlatDepth;

    impl DepthEstimator for FlatDepth {
        fn estimate(&mut self, image: &RgbImage) -> Result<GrayImage> {
            Ok(GrayImage::new(image.width(), image.height()))
        }
    }

    struct WrongSize;

    impl DepthEstimator for WrongSize {
        fn estimate(&mut self, _image: &RgbImage) -> Result<GrayImage> {
            Ok(GrayImage::new(1, 1))
        }
    }

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.photo_quality, 85);
        assert_eq!(config.depth_quality, 80);
    }

    #[test]
    fn test_invalid_quality() {
        let config = Config {
            depth_quality: 101,
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { name, .. }) if name == "depth_quality"
        ));
    }

    #[test]
    fn test_output_dir_default() {
        let config = Config::default();
        assert_eq!(
            config.output_dir_for(Path::new("photos")),
            Path::new("photos/output")
        );

        let config = Config {
            output_dir: Some(PathBuf::from("elsewhere")),
            ..Config::default()
        };
        assert_eq!(config.output_dir_for(Path::new("photos")), Path::new("elsewhere"));
    }

    #[test]
    fn test_process_image_writes_six_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("beach.png");
        RgbImage::new(600, 300).save(&input).unwrap();

        let mut pipeline = Pipeline::with_estimator(Config::default(), FlatDepth).unwrap();
        let written = pipeline.process_image(&input, dir.path()).unwrap();

        let names: Vec<_> = written.iter().map(|p| display_name(p)).collect();
        assert_eq!(
            names,
            [
                "beach-thumb.webp",
                "beach-thumb-depth.webp",
                "beach-medium.webp",
                "beach-medium-depth.webp",
                "beach-full.webp",
                "beach-full-depth.webp",
            ]
        );
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_depth_size_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.png");
        RgbImage::new(8, 8).save(&input).unwrap();

        let mut pipeline = Pipeline::with_estimator(Config::default(), WrongSize).unwrap();
        let result = pipeline.process_image(&input, dir.path());

        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
