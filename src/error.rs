//! Error types for the sandbox.
//!
//! GPU acquisition and shader compilation are the only operations that can
//! fail; everything else either succeeds or leaves prior state untouched.

use std::fmt;

use crate::suite::Stage;

/// Errors that can occur while acquiring the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors produced while assembling or compiling shader programs.
///
/// A compile error never tears down the previously compiled programs; the
/// pipeline keeps running with the last-good shader while the error is
/// reported here and in the [error log](crate::diag).
#[derive(Debug, Clone)]
pub enum ShaderError {
    /// A built-in template is missing its splice marker. Templates are fixed
    /// build artifacts, so this indicates a defective build, not bad user input.
    MarkerNotFound {
        /// The marker that could not be located.
        marker: &'static str,
    },
    /// The assembled WGSL for a stage failed to parse.
    Parse { stage: Stage, message: String },
    /// The assembled WGSL parsed but failed validation.
    Validation { stage: Stage, message: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::MarkerNotFound { marker } => {
                write!(f, "Built-in shader template is missing the '{}' marker", marker)
            }
            ShaderError::Parse { stage, message } => {
                write!(f, "Failed to parse {} shader: {}", stage, message)
            }
            ShaderError::Validation { stage, message } => {
                write!(f, "Failed to validate {} shader: {}", stage, message)
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Errors that can occur when creating or driving a [`Sandbox`](crate::Sandbox).
#[derive(Debug)]
pub enum SandboxError {
    /// GPU acquisition failed.
    Gpu(GpuError),
    /// Shader assembly or compilation failed.
    Shader(ShaderError),
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxError::Gpu(e) => write!(f, "GPU error: {}", e),
            SandboxError::Shader(e) => write!(f, "Shader error: {}", e),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandboxError::Gpu(e) => Some(e),
            SandboxError::Shader(e) => Some(e),
        }
    }
}

impl From<GpuError> for SandboxError {
    fn from(e: GpuError) -> Self {
        SandboxError::Gpu(e)
    }
}

impl From<ShaderError> for SandboxError {
    fn from(e: ShaderError) -> Self {
        SandboxError::Shader(e)
    }
}
