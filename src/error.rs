//! Error types for vdp-flow.
//!
//! The simulation core works on always-valid numeric state and never fails.
//! Errors only arise where the program touches the outside world: loading
//! configuration, bringing up the GPU and opening a window.

use std::fmt;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    Io(std::io::Error),
    /// The file is not valid JSON for a preset.
    Parse(serde_json::Error),
    /// A value is outside the range the engine can run with.
    Invalid(String),
    /// A μ-sweep whose bottom is not strictly below its top.
    InvalidSweepRange { bottom: f32, top: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read preset: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed preset: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid setting: {msg}"),
            ConfigError::InvalidSweepRange { bottom, top } => write!(
                f,
                "sweep range is empty: bottom ({}) must be below top ({})",
                bottom, top
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// The renderer could not be brought up.
#[derive(Debug)]
pub enum GpuError {
    /// The window cannot be drawn into by wgpu.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No adapter can present to the window.
    NoAdapter,
    /// The adapter refused to open a device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "cannot render to window: {e}"),
            GpuError::NoAdapter => {
                write!(f, "no graphics adapter can present to this window (Vulkan, Metal, DX12 or GL required)")
            }
            GpuError::DeviceCreation(e) => write!(f, "graphics device request failed: {e}"),
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
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(err)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(err)
    }
}

/// Anything that stops the flow window from opening or running.
#[derive(Debug)]
pub enum SimulationError {
    EventLoop(winit::error::EventLoopError),
    /// The OS would not give us a window.
    Window(winit::error::OsError),
    Gpu(GpuError),
    /// The configuration handed to the builder is unusable.
    Config(ConfigError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::EventLoop(e) => write!(f, "event loop: {e}"),
            SimulationError::Window(e) => write!(f, "cannot open flow window: {e}"),
            SimulationError::Gpu(e) => write!(f, "renderer: {e}"),
            SimulationError::Config(e) => write!(f, "configuration: {e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(match self {
            SimulationError::EventLoop(e) => e,
            SimulationError::Window(e) => e,
            SimulationError::Gpu(e) => e,
            SimulationError::Config(e) => e,
        })
    }
}

impl From<winit::error::EventLoopError> for SimulationError {
    fn from(err: winit::error::EventLoopError) -> Self {
        SimulationError::EventLoop(err)
    }
}

impl From<winit::error::OsError> for SimulationError {
    fn from(err: winit::error::OsError) -> Self {
        SimulationError::Window(err)
    }
}

impl From<GpuError> for SimulationError {
    fn from(err: GpuError) -> Self {
        SimulationError::Gpu(err)
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sweep_range_message() {
        let err = ConfigError::InvalidSweepRange { bottom: 2.0, top: 1.0 };
        let msg = err.to_string();
        assert!(msg.contains("bottom (2)"));
        assert!(msg.contains("top (1)"));
    }

    #[test]
    fn test_config_error_chains_into_simulation_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: SimulationError = ConfigError::from(io).into();
        assert!(matches!(err, SimulationError::Config(ConfigError::Io(_))));
        assert!(err.source().is_some());
    }
}
