//! Model caching, downloading, and ONNX session construction.

mod device;
mod loader;

pub use device::{load_session, Device};
pub use loader::{ModelCache, ModelKind};
