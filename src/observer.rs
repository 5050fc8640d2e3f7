//! Change notifications out of the engine.

use crate::config::FlowConfig;
use std::fmt;

/// Receives engine events. Every method has a no-op default, so an
/// implementor only overrides what it cares about.
pub trait FlowObserver {
    /// Any configuration field changed. Fires after every mutation.
    fn config_changed(&mut self, _config: &FlowConfig, _status: &Status) {}

    fn particles_resized(&mut self, _count: usize) {}

    fn pause_toggled(&mut self, _paused: bool) {}

    fn particles_reset(&mut self) {}

    fn view_reset(&mut self) {}
}

/// One-line summary of the running simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub mu: f32,
    pub particle_count: usize,
    /// Effective scale.
    pub scale: f32,
}

impl Status {
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            mu: config.mu,
            particle_count: config.particle_count,
            scale: config.effective_scale(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "μ = {:.2} (Damping) · Particles: {} · Scale: {}",
            self.mu,
            self.particle_count,
            self.scale.round() as i64
        )
    }
}
