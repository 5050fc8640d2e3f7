//! # vdp-flow - Van der Pol particle flow
//!
//! Thousands of tracer particles advected through the phase plane of the Van
//! der Pol oscillator, optionally forced, drawn with fading trails so the
//! flow and its limit cycle show up as streaks.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vdp_flow::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     Simulation::new()
//!         .with_config(FlowConfig {
//!             mu: 1.5,
//!             particle_count: 8000,
//!             ..Default::default()
//!         })
//!         .with_seed(7)
//!         .run()
//! }
//! ```
//!
//! ## The System
//!
//! ```text
//! dx/dt = y
//! dy/dt = μ(1 - x²)y - x            (standard)
//! dy/dt = μ(1 - x²)y - x + A·sin(ωt) (forced)
//! ```
//!
//! Particles take one explicit Euler step per frame of `0.01 · speed` and
//! are reseeded when they outlive their budget or leave the view.
//!
//! ## Headless Use
//!
//! [`FlowEngine`] has no window or GPU dependency. Drive it with any
//! [`Canvas`](canvas::Canvas) implementation, for example the
//! [`Recorder`](canvas::Recorder):
//!
//! ```ignore
//! let mut engine = FlowEngine::with_seed(FlowConfig::default(), 800.0, 600.0, 1);
//! let mut canvas = Recorder::new();
//! for _ in 0..60 {
//!     engine.tick(Duration::from_millis(16), &mut canvas);
//! }
//! ```
//!
//! ## Interaction
//!
//! - Drag with the left button to box-zoom; double-click to clear the zoom.
//! - Space pause, R reset, V reset view, F fit view, M toggle forcing,
//!   S toggle the μ-sweep, C toggle speed colouring, ↑/↓ adjust μ,
//!   +/- adjust the particle count.

pub mod canvas;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod observer;
pub mod particle;
pub mod scheduler;
pub mod selection;
mod simulation;
pub mod sweep;
pub mod time;
#[cfg(feature = "egui")]
pub mod ui;
pub mod viewport;

pub use canvas::{Canvas, Color, Layer, Recorder, Rect, Stroke};
pub use command::UiCommand;
pub use config::{FlowConfig, FlowPreset, OscillatorMode, SweepConfig};
pub use engine::{FlowEngine, SweepHandle};
pub use error::{ConfigError, GpuError, SimulationError};
pub use field::VectorField;
pub use glam::Vec2;
pub use observer::{FlowObserver, Status};
pub use particle::{Particle, ParticleSet};
pub use simulation::Simulation;
pub use sweep::MuSweep;
pub use viewport::{ViewTransform, Viewport};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use vdp_flow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Recorder};
    pub use crate::config::{FlowConfig, FlowPreset, OscillatorMode, SweepConfig};
    pub use crate::engine::{FlowEngine, SweepHandle};
    pub use crate::error::SimulationError;
    pub use crate::observer::{FlowObserver, Status};
    pub use crate::simulation::Simulation;
    pub use crate::Vec2;
    #[cfg(feature = "egui")]
    pub use egui;
}
