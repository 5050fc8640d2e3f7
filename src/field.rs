//! The Van der Pol vector field.
//!
//! In first-order form the oscillator reads
//!
//! ```text
//! dx/dt = y
//! dy/dt = μ(1 − x²)y − x  [+ A·sin(ω·t) when forced]
//! ```
//!
//! A [`VectorField`] is a snapshot of the parameters taken once per tick.
//! Particle advance and particle colouring both evaluate the same snapshot,
//! so the velocity used for the colour of a particle is always the one of
//! the current tick.

use crate::config::{FlowConfig, OscillatorMode};
use glam::Vec2;

/// Velocity of the unforced Van der Pol system at `p`.
#[inline]
pub fn van_der_pol(mu: f32, p: Vec2) -> Vec2 {
    Vec2::new(p.y, mu * (1.0 - p.x * p.x) * p.y - p.x)
}

/// Per-tick snapshot of everything the field depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorField {
    pub mu: f32,
    /// Additive drive on dy. Zero in standard mode.
    pub forcing: f32,
}

impl VectorField {
    /// Unforced field with damping `mu`.
    pub fn standard(mu: f32) -> Self {
        Self { mu, forcing: 0.0 }
    }

    /// Forced field evaluated at clock value `time`.
    pub fn forced(mu: f32, amplitude: f32, omega: f32, time: f32) -> Self {
        Self {
            mu,
            forcing: amplitude * (omega * time).sin(),
        }
    }

    /// Snapshot the field for the current configuration and clock.
    pub fn from_config(config: &FlowConfig) -> Self {
        match config.oscillator_mode {
            OscillatorMode::Standard => Self::standard(config.mu),
            OscillatorMode::Forced => Self::forced(
                config.mu,
                config.force_amplitude,
                config.force_omega,
                config.time,
            ),
        }
    }

    /// Velocity at world position `p`.
    #[inline]
    pub fn at(&self, p: Vec2) -> Vec2 {
        let v = van_der_pol(self.mu, p);
        Vec2::new(v.x, v.y + self.forcing)
    }

    /// Magnitude of the velocity at `p`.
    #[inline]
    pub fn speed(&self, p: Vec2) -> f32 {
        self.at(p).length()
    }
}
