//! Compute device selection and ONNX session construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::Session;

use crate::error::{Error, Result};

/// Compute device used for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// Best available accelerator, falling back to CPU.
    #[default]
    Auto,
    /// CPU only.
    Cpu,
    /// NVIDIA CUDA (requires the `cuda` feature).
    Cuda,
    /// Apple CoreML (requires the `coreml` feature).
    CoreMl,
}

impl Device {
    /// Whether support for this device was compiled in.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Auto | Self::Cpu => true,
            Self::Cuda => cfg!(feature = "cuda"),
            Self::CoreMl => cfg!(feature = "coreml"),
        }
    }

    /// Concrete devices to try, in order of preference. Always ends with CPU.
    #[must_use]
    pub fn fallback_chain(self) -> Vec<Self> {
        let preferred: &[Self] = match self {
            Self::Auto => &[Self::Cuda, Self::CoreMl],
            Self::Cpu => &[],
            Self::Cuda => &[Self::Cuda],
            Self::CoreMl => &[Self::CoreMl],
        };

        let mut chain = Vec::with_capacity(preferred.len() + 1);
        for &device in preferred {
            if device.is_available() {
                chain.push(device);
            } else if self != Self::Auto {
                tracing::warn!("{device} support is not compiled in, falling back to CPU");
            }
        }
        chain.push(Self::Cpu);
        chain
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::CoreMl => "coreml",
        })
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda),
            "coreml" | "mps" => Ok(Self::CoreMl),
            other => Err(format!(
                "unknown device '{other}' (expected auto, cpu, cuda or coreml)"
            )),
        }
    }
}

/// Build the execution provider for a concrete device.
fn build_provider(device: Device) -> Option<ExecutionProviderDispatch> {
    match device {
        Device::Cpu => Some(CPUExecutionProvider::default().build()),
        #[cfg(feature = "cuda")]
        Device::Cuda => Some(ort::execution_providers::CUDAExecutionProvider::default().build()),
        #[cfg(feature = "coreml")]
        Device::CoreMl => {
            Some(ort::execution_providers::CoreMLExecutionProvider::default().build())
        }
        _ => None,
    }
}

/// Load an ONNX model session on the requested device.
///
/// ONNX Runtime registers the providers in order and silently skips any that
/// fail to initialize, so an unusable accelerator degrades to CPU.
///
/// # Errors
///
/// Returns an error if the session cannot be built or the model cannot be loaded.
pub fn load_session(path: &Path, device: Device) -> Result<Session> {
    let name = path.display().to_string();
    let chain = device.fallback_chain();
    tracing::debug!("Execution provider preference for {name}: {chain:?}");

    let providers: Vec<_> = chain.into_iter().filter_map(build_provider).collect();

    Session::builder()
        .map_err(|err| Error::ModelLoad {
            name: name.clone(),
            source: err.into(),
        })?
        .with_execution_providers(providers)
        .map_err(|err| Error::ModelLoad {
            name: name.clone(),
            source: err.into(),
        })?
        .commit_from_file(path)
        .map_err(|err| Error::ModelLoad {
            name,
            source: err.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device() {
        assert_eq!("auto".parse::<Device>().unwrap(), Device::Auto);
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("cuda".parse::<Device>().unwrap(), Device::Cuda);
        assert_eq!("mps".parse::<Device>().unwrap(), Device::CoreMl);
        assert!("tpu".parse::<Device>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for device in [Device::Auto, Device::Cpu, Device::Cuda, Device::CoreMl] {
            assert_eq!(device.to_string().parse::<Device>().unwrap(), device);
        }
    }

    #[test]
    fn test_chain_ends_with_cpu() {
        for device in [Device::Auto, Device::Cpu, Device::Cuda, Device::CoreMl] {
            assert_eq!(device.fallback_chain().last(), Some(&Device::Cpu));
        }
        assert_eq!(Device::Cpu.fallback_chain(), [Device::Cpu]);
    }

    #[test]
    fn test_chain_skips_unavailable() {
        let chain = Device::Auto.fallback_chain();

        assert_eq!(chain.contains(&Device::Cuda), cfg!(feature = "cuda"));
        assert_eq!(chain.contains(&Device::CoreMl), cfg!(feature = "coreml"));
        assert!(!chain.contains(&Device::Auto));
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_session(&dir.path().join("missing.onnx"), Device::Cpu);

        assert!(matches!(result, Err(Error::ModelLoad { .. })));
    }
}
