//! Image discovery, loading, resizing, and saving utilities.

mod discover;
mod load;
mod resize;
mod save;

pub use discover::{discover_images, is_supported, SUPPORTED_EXTENSIONS};
pub use load::{image_to_tensor, load_image};
pub use resize::{resize_to_width, target_dimensions, SizeLabel};
pub use save::{output_paths, save_webp};

use ndarray::Array4;

/// Image tensor in NCHW format (batch, channels, height, width).
/// Values are ImageNet-normalized for the depth model.
pub type ImageTensor = Array4<f32>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Per-channel ImageNet mean.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel ImageNet standard deviation.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
