//! The frame-driven simulation core.
//!
//! [`FlowEngine`] owns everything that changes from frame to frame: the
//! configuration, the particles, the viewport size, the box-zoom gesture and
//! the μ-sweep. Hosts feed it input events, call [`FlowEngine::tick`] once per
//! displayed frame and hand it a [`Canvas`] to draw on.
//!
//! ```ignore
//! let mut engine = FlowEngine::with_seed(FlowConfig::default(), 800.0, 600.0, 7);
//! let mut canvas = Recorder::new();
//! engine.tick(Duration::from_millis(16), &mut canvas);
//! assert_eq!(canvas.circle_count(), 5000);
//! ```

use crate::canvas::{Canvas, Color, Layer};
use crate::config::{FlowConfig, OscillatorMode};
use crate::field::VectorField;
use crate::observer::{FlowObserver, Status};
use crate::particle::{ParticleSet, BASE_STEP};
use crate::scheduler::{TaskHandle, TaskSlot};
use crate::selection::BoxZoomSelector;
use crate::sweep::MuSweep;
use crate::viewport::{self, ViewTarget, ViewTransform, Viewport};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;

/// Handle to a running μ-sweep.
pub type SweepHandle = TaskHandle;

/// Background laid over the previous frame, alpha from `trail_opacity`.
const TRAIL_FADE: (u8, u8, u8) = (18, 18, 18);

pub struct FlowEngine {
    config: FlowConfig,
    viewport: Viewport,
    particles: ParticleSet,
    rng: SmallRng,
    selector: BoxZoomSelector,
    sweep: TaskSlot<MuSweep>,
    observers: Vec<Box<dyn FlowObserver>>,
    frame: u64,
}

impl FlowEngine {
    /// Create an engine with randomly placed particles.
    pub fn new(config: FlowConfig, width: f32, height: f32) -> Self {
        Self::with_rng(config, width, height, SmallRng::from_entropy())
    }

    /// Create an engine whose particle placement is reproducible.
    pub fn with_seed(config: FlowConfig, width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(config, width, height, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: FlowConfig, width: f32, height: f32, mut rng: SmallRng) -> Self {
        debug_assert!(
            config.min_scale <= config.max_scale,
            "scale bounds out of order: {}..{}",
            config.min_scale,
            config.max_scale
        );
        config.sanitize();
        let viewport = Viewport::new(width, height);
        let view = viewport.transform(&config);
        let particles = ParticleSet::with_count(config.particle_count, &mut rng, &view);
        log::info!(
            "flow engine: {} particles, {}x{} viewport, mu = {}",
            particles.len(),
            width,
            height,
            config.mu
        );
        Self {
            config,
            viewport,
            particles,
            rng,
            selector: BoxZoomSelector::new(),
            sweep: TaskSlot::new(),
            observers: Vec::new(),
            frame: 0,
        }
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: impl FlowObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[inline]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    #[inline]
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn selector(&self) -> &BoxZoomSelector {
        &self.selector
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The world/screen mapping for the current state.
    pub fn view(&self) -> ViewTransform {
        self.viewport.transform(&self.config)
    }

    pub fn status(&self) -> Status {
        Status::from_config(&self.config)
    }

    /// Edit the configuration in place.
    ///
    /// The record is sanitized afterwards, and the side effects of the edit
    /// are applied: particle resizes, clock reset on a mode switch, pause
    /// notifications. Observers always get `config_changed`.
    ///
    /// # Panics
    ///
    /// If the edit leaves `min_scale > max_scale` or either bound NaN.
    /// Records from outside the program go through
    /// [`FlowConfig::validate`] first.
    pub fn update_config(&mut self, edit: impl FnOnce(&mut FlowConfig)) {
        let before = self.config.clone();
        edit(&mut self.config);
        self.config.sanitize();

        if self.config.oscillator_mode != before.oscillator_mode {
            log::info!("oscillator mode: {}", self.config.oscillator_mode.name());
            self.config.time = 0.0;
        }
        if self.config.particle_count != self.particles.len() {
            let view = self.view();
            self.particles
                .resize(self.config.particle_count, &mut self.rng, &view);
            log::debug!("resized to {} particles", self.particles.len());
            let count = self.particles.len();
            self.each_observer(|o| o.particles_resized(count));
        }
        if self.config.paused != before.paused {
            let paused = self.config.paused;
            self.each_observer(|o| o.pause_toggled(paused));
        }
        self.notify_config();
    }

    pub fn set_particle_count(&mut self, count: usize) {
        self.update_config(|c| c.particle_count = count);
    }

    pub fn toggle_pause(&mut self) {
        self.update_config(|c| c.paused = !c.paused);
    }

    /// Switch oscillator mode. The forced clock restarts from zero.
    pub fn set_oscillator_mode(&mut self, mode: OscillatorMode) {
        self.update_config(|c| c.oscillator_mode = mode);
    }

    /// Move the zoom slider. An active box-zoom keeps precedence.
    pub fn set_slider_scale(&mut self, scale: f32) {
        self.update_config(|c| {
            c.slider_scale = scale;
            c.scale = scale;
        });
    }

    /// Reseed every particle and restart the forced clock.
    pub fn reset_particles(&mut self) {
        let view = self.view();
        self.particles.reset_all(&mut self.rng, &view);
        self.config.time = 0.0;
        log::debug!("reset {} particles", self.particles.len());
        self.each_observer(|o| o.particles_reset());
        self.notify_config();
    }

    /// Drop any box-zoom and return to the slider scale at the origin.
    pub fn reset_view(&mut self) {
        self.selector.cancel();
        self.config.zoom_override = false;
        self.config.scale = self.config.slider_scale;
        self.config.offset_x = 0.0;
        self.config.offset_y = 0.0;
        self.config.sanitize();
        self.each_observer(|o| o.view_reset());
        self.notify_config();
    }

    /// Frame the current particle cloud and reseed inside the new view.
    pub fn fit_view_to_particles(&mut self) {
        let target = viewport::fit_bounds(self.particles.bounds(), &self.viewport, &self.config);
        log::debug!("fit view: scale {:.1} at {:?}", target.scale, target.center);
        self.config.zoom_override = false;
        self.config.scale = target.scale;
        self.apply_center(target);

        let view = self.view();
        self.particles.reset_all(&mut self.rng, &view);
        self.notify_config();
    }

    /// Start a μ-sweep, replacing any sweep already running.
    pub fn start_sweep(&mut self, sweep: MuSweep) -> SweepHandle {
        let interval = sweep.interval();
        log::info!(
            "mu sweep {}..{} step {} every {:?}",
            sweep.bottom(),
            sweep.top(),
            sweep.step(),
            interval
        );
        let (handle, replaced) = self.sweep.start(sweep, interval);
        if replaced.is_some() {
            log::debug!("replaced running sweep");
        }
        handle
    }

    /// Stop the running sweep, if any. Safe to call repeatedly.
    pub fn stop_sweep(&mut self) {
        if self.sweep.stop().is_some() {
            log::info!("mu sweep stopped at mu = {:.2}", self.config.mu);
        }
    }

    /// Stop the sweep `handle` was issued for. A stale handle does nothing.
    pub fn cancel_sweep(&mut self, handle: SweepHandle) -> bool {
        self.sweep.cancel(handle)
    }

    #[inline]
    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_active()
    }

    pub fn active_sweep(&self) -> Option<&MuSweep> {
        self.sweep.task()
    }

    /// Primary button pressed at a screen position.
    pub fn pointer_down(&mut self, at: Vec2) {
        self.selector.press(at);
    }

    pub fn pointer_move(&mut self, to: Vec2) {
        self.selector.drag(to);
    }

    /// Primary button released. Returns `true` when a box-zoom was applied.
    pub fn pointer_up(&mut self) -> bool {
        let Some(rect) = self.selector.release() else {
            return false;
        };
        let target = viewport::zoom_to_rect(rect, &self.view(), &self.config);
        log::debug!("box zoom: scale {:.1} at {:?}", target.scale, target.center);
        self.config.zoom_override = true;
        self.config.zoom_scale = target.scale;
        self.apply_center(target);
        self.notify_config();
        true
    }

    /// Double-click clears a box-zoom.
    pub fn double_click(&mut self) {
        self.reset_view();
    }

    /// The drawing surface changed size. Takes effect from the next tick.
    ///
    /// Empty or non-finite sizes (a minimised window) are ignored, so
    /// reseeds keep using the last real view.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            log::debug!("ignoring resize to {}x{}", width, height);
            return;
        }
        self.viewport = Viewport::new(width, height);
    }

    /// Run one frame.
    ///
    /// Due sweep firings run first, then the trail fade, the particle update
    /// (skipped while paused), the particle draw and the selection overlay.
    /// Advance and draw see the same field snapshot; the forced clock moves
    /// once afterwards.
    pub fn tick(&mut self, dt: Duration, canvas: &mut impl Canvas) {
        self.run_sweep(dt);

        canvas.set_layer(Layer::Trails);
        let (r, g, b) = TRAIL_FADE;
        canvas.fill_rect(
            self.viewport.rect(),
            Color::rgba8(r, g, b, self.config.trail_opacity),
        );

        let view = self.view();
        let field = VectorField::from_config(&self.config);
        let step = BASE_STEP * self.config.particle_speed;
        if !self.config.paused {
            self.particles
                .advance_all(&field, step, &view, &mut self.rng);
        }
        self.particles
            .draw_all(&field, &view, self.config.color_speed, canvas);

        if !self.config.paused && self.config.oscillator_mode == OscillatorMode::Forced {
            self.config.time += step;
        }

        canvas.set_layer(Layer::Overlay);
        self.selector.draw(canvas);
        self.frame += 1;
    }

    fn run_sweep(&mut self, dt: Duration) {
        let mut mu = self.config.mu;
        let fired = self.sweep.run_due(dt, |sweep| mu = sweep.next_mu(mu));
        if fired > 0 {
            self.config.mu = mu;
            self.notify_config();
        }
    }

    fn apply_center(&mut self, target: ViewTarget) {
        self.config.offset_x = target.center.x;
        self.config.offset_y = target.center.y;
    }

    fn notify_config(&mut self) {
        let status = self.status();
        let config = &self.config;
        for observer in &mut self.observers {
            observer.config_changed(config, &status);
        }
    }

    fn each_observer(&mut self, mut f: impl FnMut(&mut dyn FlowObserver)) {
        for observer in &mut self.observers {
            f(observer.as_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, Recorder};

    const FRAME: Duration = Duration::from_millis(16);

    fn engine(count: usize) -> FlowEngine {
        let config = FlowConfig {
            particle_count: count,
            ..Default::default()
        };
        FlowEngine::with_seed(config, 800.0, 600.0, 42)
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scale bounds out of order")]
    fn test_inverted_scale_bounds_rejected() {
        let config = FlowConfig {
            min_scale: 500.0,
            max_scale: 50.0,
            ..Default::default()
        };
        FlowEngine::with_seed(config, 800.0, 600.0, 1);
    }

    #[test]
    fn test_tick_draws_every_particle() {
        let mut e = engine(300);
        let mut rec = Recorder::new();
        e.tick(FRAME, &mut rec);
        assert_eq!(rec.circle_count(), 300);
        assert_eq!(e.frame(), 1);
    }

    #[test]
    fn test_tick_fades_trails_first() {
        let mut e = engine(10);
        e.update_config(|c| c.trail_opacity = 0.05);
        let mut rec = Recorder::new();
        e.tick(FRAME, &mut rec);
        match &rec.commands()[0] {
            DrawCommand::FillRect { layer, rect, color } => {
                assert_eq!(*layer, Layer::Trails);
                assert_eq!(rect.size, Vec2::new(800.0, 600.0));
                assert_eq!(*color, Color::rgba8(18, 18, 18, 0.05));
            }
            other => panic!("expected fade rect, got {other:?}"),
        }
    }

    #[test]
    fn test_paused_tick_keeps_positions() {
        let mut e = engine(50);
        e.toggle_pause();
        let before = e.particles().as_slice().to_vec();
        e.tick(FRAME, &mut Recorder::new());
        assert_eq!(e.particles().as_slice(), &before[..]);
    }

    #[test]
    fn test_mode_switch_resets_clock() {
        let mut e = engine(5);
        e.set_oscillator_mode(OscillatorMode::Forced);
        for _ in 0..10 {
            e.tick(FRAME, &mut Recorder::new());
        }
        assert!(e.config().time > 0.0);
        e.set_oscillator_mode(OscillatorMode::Standard);
        assert_eq!(e.config().time, 0.0);
    }

    #[test]
    fn test_sweep_fires_from_tick() {
        let mut e = engine(5);
        let sweep = crate::config::SweepConfig {
            bottom: 0.0,
            top: 5.0,
            step: 0.1,
            interval_ms: 10,
        }
        .build()
        .unwrap();
        e.update_config(|c| c.mu = 1.0);
        e.start_sweep(sweep);
        e.tick(Duration::from_millis(30), &mut Recorder::new());
        assert!((e.config().mu - 1.3).abs() < 1e-5);
    }
}
