//! Depth estimation and the batch conversion pipeline.

mod batch;
mod depth;

pub use batch::{Config, Pipeline, Summary, DEFAULT_OUTPUT_SUBDIR};
pub use depth::{
    depth_dims, model_input_size, normalize_depth, upsample_depth, DepthAnything, DepthEstimator,
};
