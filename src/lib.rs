//! # depthgen
//!
//! A library for turning a directory of photographs into resized photo and
//! depth-map variants, ready to be served as WEBP.
//!
//! Depth is estimated with Depth Anything V2 Small running on ONNX Runtime.
//! Each photo yields a `thumb`, `medium` and `full` variant, each paired with
//! a grayscale depth map of the same size.
//!
//! ## Example
//!
//! ```no_run
//! use depthgen::{Config, Pipeline};
//!
//! # fn main() -> depthgen::Result<()> {
//! let config = Config::default();
//! let mut pipeline = Pipeline::new(config)?;
//!
//! let summary = pipeline.process_directory("photos")?;
//! println!("wrote {} files", summary.outputs.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;

pub use error::{Error, Result};
pub use model::Device;
pub use pipeline::{Config, DepthEstimator, Pipeline, Summary};
