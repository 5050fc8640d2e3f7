//! Control commands.
//!
//! Both the egui panel and the keyboard shortcuts produce [`UiCommand`]s;
//! the host applies them to the engine between frames.

use crate::config::{OscillatorMode, SweepConfig};
use crate::engine::FlowEngine;
use crate::error::ConfigError;
use crate::input::KeyCode;

/// μ change per arrow-key press.
pub const MU_NUDGE: f32 = 0.05;

/// Particle count change per +/- press.
pub const PARTICLE_NUDGE: i64 = 500;

/// Largest particle count the controls offer.
pub const MAX_PARTICLES: usize = 10_000;

/// Smallest particle count the controls offer.
pub const MIN_PARTICLES: usize = 100;

/// Upper bound of the μ control.
pub const MAX_MU: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    SetMu(f32),
    /// Shift μ by a signed amount, clamped to the control range.
    NudgeMu(f32),
    SetParticleCount(usize),
    /// Shift the particle count, clamped to the control range.
    NudgeParticles(i64),
    SetSpeed(f32),
    SetScale(f32),
    SetTrailOpacity(f32),
    SetColorSpeed(bool),
    ToggleColorSpeed,
    TogglePause,
    Reset,
    ResetView,
    FitView,
    SetMode(OscillatorMode),
    ToggleMode,
    SetForceAmplitude(f32),
    SetForceOmega(f32),
    /// Start a sweep with the given settings, replacing any running one.
    StartSweep(SweepConfig),
    StopSweep,
    /// Stop the running sweep, or start one from the host's sweep settings.
    ToggleSweep,
}

impl UiCommand {
    /// The shortcut bound to `key`, if any.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let command = match key {
            KeyCode::Space => UiCommand::TogglePause,
            KeyCode::R => UiCommand::Reset,
            KeyCode::V => UiCommand::ResetView,
            KeyCode::F => UiCommand::FitView,
            KeyCode::M => UiCommand::ToggleMode,
            KeyCode::S => UiCommand::ToggleSweep,
            KeyCode::C => UiCommand::ToggleColorSpeed,
            KeyCode::Up => UiCommand::NudgeMu(MU_NUDGE),
            KeyCode::Down => UiCommand::NudgeMu(-MU_NUDGE),
            KeyCode::Plus => UiCommand::NudgeParticles(PARTICLE_NUDGE),
            KeyCode::Minus => UiCommand::NudgeParticles(-PARTICLE_NUDGE),
            _ => return None,
        };
        Some(command)
    }

    /// Apply to `engine`. `sweep` supplies the settings for [`UiCommand::ToggleSweep`].
    pub fn apply(self, engine: &mut FlowEngine, sweep: &SweepConfig) -> Result<(), ConfigError> {
        match self {
            UiCommand::SetMu(mu) => engine.update_config(|c| c.mu = mu),
            UiCommand::NudgeMu(delta) => {
                engine.update_config(|c| c.mu = (c.mu + delta).clamp(0.0, MAX_MU))
            }
            UiCommand::SetParticleCount(count) => engine.set_particle_count(count),
            UiCommand::NudgeParticles(delta) => {
                let current = engine.config().particle_count as i64;
                let next = (current + delta).clamp(MIN_PARTICLES as i64, MAX_PARTICLES as i64);
                engine.set_particle_count(next as usize);
            }
            UiCommand::SetSpeed(speed) => engine.update_config(|c| c.particle_speed = speed),
            UiCommand::SetScale(scale) => engine.set_slider_scale(scale),
            UiCommand::SetTrailOpacity(opacity) => {
                engine.update_config(|c| c.trail_opacity = opacity)
            }
            UiCommand::SetColorSpeed(on) => engine.update_config(|c| c.color_speed = on),
            UiCommand::ToggleColorSpeed => engine.update_config(|c| c.color_speed = !c.color_speed),
            UiCommand::TogglePause => engine.toggle_pause(),
            UiCommand::Reset => engine.reset_particles(),
            UiCommand::ResetView => engine.reset_view(),
            UiCommand::FitView => engine.fit_view_to_particles(),
            UiCommand::SetMode(mode) => engine.set_oscillator_mode(mode),
            UiCommand::ToggleMode => {
                let mode = engine.config().oscillator_mode.toggled();
                engine.set_oscillator_mode(mode);
            }
            UiCommand::SetForceAmplitude(a) => engine.update_config(|c| c.force_amplitude = a),
            UiCommand::SetForceOmega(w) => engine.update_config(|c| c.force_omega = w),
            UiCommand::StartSweep(config) => {
                engine.start_sweep(config.build()?);
            }
            UiCommand::StopSweep => engine.stop_sweep(),
            UiCommand::ToggleSweep => {
                if engine.is_sweeping() {
                    engine.stop_sweep();
                } else {
                    engine.start_sweep(sweep.build()?);
                }
            }
        }
        Ok(())
    }
}
