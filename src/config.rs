//! Configuration for Van der Pol flow simulations.
//!
//! [`FlowConfig`] is the single parameter record shared by the control
//! surface and the frame loop. It is owned by [`FlowEngine`](crate::FlowEngine)
//! and handed by reference to the field, particle and viewport code every tick.
//!
//! Presets can be stored as JSON. Every field is optional; anything missing
//! falls back to the defaults below.
//!
//! ```ignore
//! {
//!     "config": { "mu": 2.5, "particle_count": 8000, "oscillator_mode": "forced" },
//!     "sweep": { "bottom": 0.0, "top": 4.0, "step": 0.02, "interval_ms": 40 },
//!     "seed": 7
//! }
//! ```

use crate::error::ConfigError;
use crate::sweep::MuSweep;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Upper bound of the trail opacity control.
pub const MAX_TRAIL_OPACITY: f32 = 0.18;

/// Which form of the oscillator drives the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorMode {
    /// Autonomous Van der Pol system.
    #[default]
    Standard,
    /// Adds a sinusoidal drive `A·sin(ω·t)` to the y equation.
    Forced,
}

impl OscillatorMode {
    pub fn name(&self) -> &'static str {
        match self {
            OscillatorMode::Standard => "Standard",
            OscillatorMode::Forced => "Forced",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            OscillatorMode::Standard => OscillatorMode::Forced,
            OscillatorMode::Forced => OscillatorMode::Standard,
        }
    }
}

/// Shared simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Damping coefficient μ.
    pub mu: f32,
    pub particle_count: usize,
    /// Multiplier on the base integration step of 0.01.
    pub particle_speed: f32,
    /// Alpha of the background fill laid over the previous frame.
    pub trail_opacity: f32,
    /// Colour particles by local flow speed instead of plain white.
    pub color_speed: bool,
    pub paused: bool,

    /// Pixels per world unit, as last set by the zoom slider or a fit.
    pub scale: f32,
    /// Scale chosen on the zoom slider, restored when a box-zoom is cleared.
    pub slider_scale: f32,
    pub default_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,

    /// World-space point shown at the centre of the canvas.
    pub offset_x: f32,
    pub offset_y: f32,

    /// When set, `zoom_scale` replaces `scale` for rendering and physics.
    pub zoom_override: bool,
    pub zoom_scale: f32,

    pub oscillator_mode: OscillatorMode,
    pub force_amplitude: f32,
    pub force_omega: f32,
    /// Simulation clock for the forced drive. Only advances in forced mode.
    pub time: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            mu: 0.6,
            particle_count: 5000,
            particle_speed: 3.0,
            trail_opacity: 0.01,
            color_speed: true,
            paused: false,
            scale: 100.0,
            slider_scale: 100.0,
            default_scale: 500.0,
            min_scale: 10.0,
            max_scale: 5000.0,
            offset_x: 0.0,
            offset_y: 0.0,
            zoom_override: false,
            zoom_scale: 100.0,
            oscillator_mode: OscillatorMode::Standard,
            force_amplitude: 1.0,
            force_omega: 1.0,
            time: 0.0,
        }
    }
}

impl FlowConfig {
    /// Parse a config record from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Clamp a scale value into `[min_scale, max_scale]`.
    #[inline]
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Scale actually used for rendering and physics.
    ///
    /// The box-zoom override wins over the slider scale. The result is
    /// always inside `[min_scale, max_scale]`.
    #[inline]
    pub fn effective_scale(&self) -> f32 {
        let raw = if self.zoom_override { self.zoom_scale } else { self.scale };
        self.clamp_scale(raw)
    }

    /// Re-establish the scale invariants after an in-place edit.
    ///
    /// # Panics
    ///
    /// If `min_scale > max_scale` or either bound is NaN.
    pub fn sanitize(&mut self) {
        self.scale = self.clamp_scale(self.scale);
        self.slider_scale = self.clamp_scale(self.slider_scale);
        self.zoom_scale = self.clamp_scale(self.zoom_scale);
        self.default_scale = self.clamp_scale(self.default_scale);
        self.trail_opacity = self.trail_opacity.clamp(0.0, MAX_TRAIL_OPACITY);
        self.mu = self.mu.max(0.0);
        self.time = self.time.max(0.0);
    }

    /// Reject records that the engine cannot run with.
    ///
    /// The engine itself assumes a valid record; this runs at the edges
    /// where configuration enters the program.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.mu,
            self.particle_speed,
            self.trail_opacity,
            self.scale,
            self.slider_scale,
            self.default_scale,
            self.min_scale,
            self.max_scale,
            self.offset_x,
            self.offset_y,
            self.zoom_scale,
            self.force_amplitude,
            self.force_omega,
            self.time,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("all numeric values must be finite".into()));
        }
        if self.mu < 0.0 {
            return Err(ConfigError::Invalid(format!("mu must be >= 0, got {}", self.mu)));
        }
        if self.particle_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "particle_speed must be > 0, got {}",
                self.particle_speed
            )));
        }
        if !(0.0..=MAX_TRAIL_OPACITY).contains(&self.trail_opacity) {
            return Err(ConfigError::Invalid(format!(
                "trail_opacity must be within [0, {}], got {}",
                MAX_TRAIL_OPACITY, self.trail_opacity
            )));
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "scale bounds must satisfy 0 < min_scale <= max_scale, got [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        if self.time < 0.0 {
            return Err(ConfigError::Invalid("time must be >= 0".into()));
        }
        Ok(())
    }
}

/// Settings for the background μ-sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub bottom: f32,
    pub top: f32,
    /// Change in μ per firing.
    pub step: f32,
    /// Milliseconds between firings.
    pub interval_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            bottom: 0.0,
            top: 5.0,
            step: 0.02,
            interval_ms: 50,
        }
    }
}

impl SweepConfig {
    /// Validate the range and build the sweep it describes.
    pub fn build(&self) -> Result<MuSweep, ConfigError> {
        if !self.bottom.is_finite() || !self.top.is_finite() || self.bottom >= self.top {
            return Err(ConfigError::InvalidSweepRange {
                bottom: self.bottom,
                top: self.top,
            });
        }
        if self.bottom < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sweep bottom must be >= 0, got {}",
                self.bottom
            )));
        }
        if !(self.step > 0.0) {
            return Err(ConfigError::Invalid(format!("sweep step must be > 0, got {}", self.step)));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("sweep interval_ms must be > 0".into()));
        }
        Ok(MuSweep::new(
            self.bottom,
            self.top,
            self.step,
            Duration::from_millis(self.interval_ms),
        ))
    }
}

/// Everything a preset file can carry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowPreset {
    pub config: FlowConfig,
    /// Sweep started as soon as the window opens.
    pub sweep: Option<SweepConfig>,
    /// Seed for particle placement. Random when absent.
    pub seed: Option<u64>,
}

impl FlowPreset {
    /// Parse a preset from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let preset: FlowPreset = serde_json::from_str(json)?;
        preset.config.validate()?;
        if let Some(sweep) = &preset.sweep {
            sweep.build()?;
        }
        Ok(preset)
    }

    /// Load a preset from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize this preset as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mu, 0.6);
        assert_eq!(config.particle_count, 5000);
        assert_eq!(config.effective_scale(), 100.0);
    }

    #[test]
    fn test_effective_scale_prefers_override() {
        let mut config = FlowConfig::default();
        config.zoom_scale = 750.0;
        assert_eq!(config.effective_scale(), 100.0);

        config.zoom_override = true;
        assert_eq!(config.effective_scale(), 750.0);
    }

    #[test]
    fn test_effective_scale_is_clamped() {
        let mut config = FlowConfig::default();
        config.zoom_override = true;
        config.zoom_scale = 1.0e6;
        assert_eq!(config.effective_scale(), config.max_scale);

        config.zoom_scale = 0.0;
        assert_eq!(config.effective_scale(), config.min_scale);
    }

    #[test]
    fn test_sanitize_clamps_scales_and_trail() {
        let mut config = FlowConfig::default();
        config.scale = 2.0;
        config.slider_scale = 9000.0;
        config.trail_opacity = 0.5;
        config.mu = -1.0;
        config.sanitize();

        assert_eq!(config.scale, 10.0);
        assert_eq!(config.slider_scale, 5000.0);
        assert_eq!(config.trail_opacity, MAX_TRAIL_OPACITY);
        assert_eq!(config.mu, 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FlowConfig::from_json_str(r#"{ "mu": 2.0, "oscillator_mode": "forced" }"#)
            .expect("partial config should parse");
        assert_eq!(config.mu, 2.0);
        assert_eq!(config.oscillator_mode, OscillatorMode::Forced);
        assert_eq!(config.particle_count, 5000);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            FlowConfig::from_json_str(r#"{ "particle_speed": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FlowConfig::from_json_str(r#"{ "min_scale": 100.0, "max_scale": 50.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            FlowConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_sweep_range_validation() {
        let bad = SweepConfig {
            bottom: 3.0,
            top: 1.0,
            ..Default::default()
        };
        assert!(matches!(bad.build(), Err(ConfigError::InvalidSweepRange { .. })));

        let equal = SweepConfig {
            bottom: 1.0,
            top: 1.0,
            ..Default::default()
        };
        assert!(equal.build().is_err());

        assert!(SweepConfig::default().build().is_ok());
    }

    #[test]
    fn test_preset_roundtrip_through_json() {
        let preset = FlowPreset {
            config: FlowConfig {
                mu: 1.5,
                ..Default::default()
            },
            sweep: Some(SweepConfig::default()),
            seed: Some(11),
        };
        let json = preset.to_json().unwrap();
        let back = FlowPreset::from_json_str(&json).unwrap();
        assert_eq!(back, preset);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(OscillatorMode::Standard.toggled(), OscillatorMode::Forced);
        assert_eq!(OscillatorMode::Forced.toggled(), OscillatorMode::Standard);
    }
}
