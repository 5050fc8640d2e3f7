//! Integration tests for the flow engine.
//!
//! These drive [`FlowEngine`] headlessly through a [`Recorder`] canvas and
//! check the behaviour a user sees: particle lifecycle, view changes from
//! box-zoom and fitting, the forced clock and the μ-sweep.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vdp_flow::canvas::{DrawCommand, Layer, Recorder};
use vdp_flow::field::van_der_pol;
use vdp_flow::particle::{speed_color, LIFE_RANGE};
use vdp_flow::viewport::MARGIN_FACTOR;
use vdp_flow::{
    FlowConfig, FlowEngine, FlowObserver, OscillatorMode, Status, SweepConfig, Vec2, VectorField,
    Viewport,
};

const FRAME: Duration = Duration::from_millis(16);
const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn engine_with(count: usize) -> FlowEngine {
    let config = FlowConfig {
        particle_count: count,
        ..Default::default()
    };
    FlowEngine::with_seed(config, WIDTH, HEIGHT, 1234)
}

fn sweep(bottom: f32, top: f32, step: f32, interval_ms: u64) -> vdp_flow::MuSweep {
    SweepConfig {
        bottom,
        top,
        step,
        interval_ms,
    }
    .build()
    .expect("valid sweep")
}

// ============================================================================
// Field and transforms
// ============================================================================

#[test]
fn test_standard_field_reference_point() {
    assert_eq!(van_der_pol(0.6, Vec2::new(1.0, 0.0)), Vec2::new(0.0, -1.0));

    let p = Vec2::new(0.5, 2.0);
    let mu = 1.7;
    let expected = Vec2::new(2.0, mu * (1.0 - 0.25) * 2.0 - 0.5);
    assert_eq!(van_der_pol(mu, p), expected);
}

#[test]
fn test_origin_projects_to_canvas_centre() {
    let engine = engine_with(0);
    let view = engine.view();
    assert_eq!(view.world_to_screen(Vec2::ZERO), Vec2::new(400.0, 300.0));
}

// ============================================================================
// Particle lifecycle
// ============================================================================

#[test]
fn test_resize_keeps_prefix_and_count() {
    let mut engine = engine_with(1000);
    let before = engine.particles().as_slice().to_vec();

    engine.set_particle_count(300);
    assert_eq!(engine.particles().len(), 300);
    assert_eq!(engine.config().particle_count, 300);
    assert_eq!(engine.particles().as_slice(), &before[..300]);

    engine.set_particle_count(1500);
    assert_eq!(engine.particles().len(), 1500);
    assert_eq!(&engine.particles().as_slice()[..300], &before[..300]);
}

#[test]
fn test_particles_stay_in_margined_box() {
    let mut engine = engine_with(2000);
    engine.update_config(|c| c.mu = 3.0);
    let mut canvas = Recorder::new();
    for _ in 0..300 {
        canvas.clear();
        engine.tick(FRAME, &mut canvas);
    }

    let view = engine.view();
    for p in engine.particles().iter() {
        assert!(view.contains_margined(p.position), "{:?}", p.position);
        assert!(p.age <= p.life);
        assert!(LIFE_RANGE.contains(&p.life));
    }
}

#[test]
fn test_reset_reseeds_inside_view() {
    let mut engine = engine_with(500);
    for _ in 0..20 {
        engine.tick(FRAME, &mut Recorder::new());
    }
    engine.reset_particles();

    assert!(engine.particles().iter().all(|p| p.age == 0));
    assert_inside_window(&engine);
}

fn assert_inside_window(engine: &FlowEngine) {
    let view = engine.view();
    let half = view.world_extent() / 2.0;
    for p in engine.particles().iter() {
        let d = (p.position - view.center).abs();
        assert!(d.x <= half.x && d.y <= half.y, "{:?} outside view", p.position);
    }
}

#[test]
fn test_drawn_colour_uses_same_field_as_advance() {
    let mut engine = engine_with(300);
    engine.update_config(|c| {
        c.mu = 1.3;
        c.force_amplitude = 2.5;
        c.force_omega = 4.0;
    });
    engine.set_oscillator_mode(OscillatorMode::Forced);
    for _ in 0..7 {
        engine.tick(FRAME, &mut Recorder::new());
    }

    let field = VectorField::from_config(engine.config());
    assert_ne!(field.forcing, 0.0);
    let mut canvas = Recorder::new();
    engine.tick(FRAME, &mut canvas);
    assert_ne!(VectorField::from_config(engine.config()), field);

    let colours: Vec<_> = canvas
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillCircle { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colours.len(), engine.particles().len());
    for (p, colour) in engine.particles().iter().zip(colours) {
        assert_eq!(colour, speed_color(field.speed(p.position)));
    }
}

#[test]
fn test_reset_under_box_zoom_uses_zoomed_window() {
    let mut engine = engine_with(800);
    engine.pointer_down(Vec2::new(500.0, 200.0));
    engine.pointer_move(Vec2::new(580.0, 260.0));
    assert!(engine.pointer_up());

    let config = engine.config();
    assert_ne!(config.zoom_scale, config.scale);
    assert_eq!(engine.view().scale, config.zoom_scale);

    engine.reset_particles();
    assert_inside_window(&engine);

    let spread = engine.particles().bounds().expect("particles exist").extent();
    let window = engine.view().world_extent();
    assert!(spread.x > window.x / 2.0 && spread.y > window.y / 2.0);
}

#[test]
fn test_minimised_window_keeps_last_view() {
    let mut engine = engine_with(1000);
    engine.resize(0.0, 0.0);
    assert_eq!(engine.viewport(), Viewport::new(WIDTH, HEIGHT));
    engine.resize(f32::NAN, 600.0);
    assert_eq!(engine.viewport(), Viewport::new(WIDTH, HEIGHT));

    engine.reset_particles();
    for _ in 0..3 {
        engine.tick(FRAME, &mut Recorder::new());
    }
    engine.resize(WIDTH, HEIGHT);
    engine.tick(FRAME, &mut Recorder::new());

    let at_origin = engine
        .particles()
        .iter()
        .filter(|p| p.position == Vec2::ZERO)
        .count();
    assert_eq!(at_origin, 0);
    let spread = engine.particles().bounds().expect("particles exist").extent();
    assert!(spread.x > 4.0 && spread.y > 3.0, "spread {spread:?}");
}

#[test]
fn test_frame_draws_fade_particles_then_overlay() {
    let mut engine = engine_with(100);
    engine.pointer_down(Vec2::new(10.0, 10.0));
    engine.pointer_move(Vec2::new(60.0, 50.0));

    let mut canvas = Recorder::new();
    engine.tick(FRAME, &mut canvas);

    let commands = canvas.commands();
    assert!(matches!(commands[0], DrawCommand::FillRect { layer: Layer::Trails, .. }));
    assert_eq!(canvas.circle_count(), 100);
    assert!(commands[1..=100]
        .iter()
        .all(|c| matches!(c, DrawCommand::FillCircle { layer: Layer::Trails, .. })));
    assert_eq!(canvas.on_layer(Layer::Overlay).count(), 2);
}

// ============================================================================
// Box zoom and view fitting
// ============================================================================

#[test]
fn test_small_box_zoom_is_ignored() {
    let mut engine = engine_with(10);
    engine.pointer_down(Vec2::new(100.0, 100.0));
    engine.pointer_move(Vec2::new(104.0, 200.0));
    assert!(!engine.pointer_up());

    let config = engine.config();
    assert!(!config.zoom_override);
    assert_eq!((config.offset_x, config.offset_y), (0.0, 0.0));
}

#[test]
fn test_box_zoom_sets_override_and_centre() {
    let mut engine = engine_with(10);
    let view = engine.view();
    engine.pointer_down(Vec2::new(400.0, 300.0));
    engine.pointer_move(Vec2::new(600.0, 400.0));
    assert!(engine.pointer_up());

    let config = engine.config();
    assert!(config.zoom_override);
    assert_eq!(config.zoom_scale, 400.0);
    assert_eq!(config.effective_scale(), 400.0);
    let centre = view.screen_to_world(Vec2::new(500.0, 350.0));
    assert_eq!(Vec2::new(config.offset_x, config.offset_y), centre);
}

#[test]
fn test_tiny_box_zoom_clamps_to_max_scale() {
    let mut engine = engine_with(10);
    engine.pointer_down(Vec2::new(0.0, 0.0));
    engine.pointer_move(Vec2::new(7.0, 7.0));
    assert!(engine.pointer_up());
    assert_eq!(engine.config().zoom_scale, engine.config().max_scale);
}

#[test]
fn test_double_click_clears_zoom() {
    let mut engine = engine_with(10);
    engine.set_slider_scale(250.0);
    engine.pointer_down(Vec2::new(100.0, 100.0));
    engine.pointer_move(Vec2::new(300.0, 250.0));
    engine.pointer_up();
    assert!(engine.config().zoom_override);

    engine.double_click();
    let config = engine.config();
    assert!(!config.zoom_override);
    assert_eq!(config.scale, 250.0);
    assert_eq!((config.offset_x, config.offset_y), (0.0, 0.0));
}

#[test]
fn test_fit_with_no_particles_uses_default_view() {
    let mut engine = engine_with(0);
    engine.update_config(|c| {
        c.offset_x = 3.0;
        c.offset_y = -1.0;
    });
    engine.fit_view_to_particles();

    let config = engine.config();
    assert_eq!(config.scale, config.default_scale);
    assert_eq!((config.offset_x, config.offset_y), (0.0, 0.0));
}

#[test]
fn test_fit_frames_particles_and_reseeds() {
    let mut engine = engine_with(400);
    for _ in 0..50 {
        engine.tick(FRAME, &mut Recorder::new());
    }
    let bounds = engine.particles().bounds().expect("particles exist");
    engine.fit_view_to_particles();

    let config = engine.config();
    let extent = bounds.extent() * MARGIN_FACTOR;
    let expected = (WIDTH / extent.x).min(HEIGHT / extent.y);
    assert!((config.scale - config.clamp_scale(expected)).abs() < 1e-3);
    assert_eq!(Vec2::new(config.offset_x, config.offset_y), bounds.center());
    assert!(engine.particles().iter().all(|p| p.age == 0));
}

#[test]
fn test_resize_changes_projection() {
    let mut engine = engine_with(10);
    engine.resize(1000.0, 500.0);
    assert_eq!(engine.view().world_to_screen(Vec2::ZERO), Vec2::new(500.0, 250.0));
}

// ============================================================================
// Forced clock
// ============================================================================

#[test]
fn test_forced_clock_advances_once_per_frame() {
    for count in [1, 50, 2000] {
        let mut engine = engine_with(count);
        engine.set_oscillator_mode(OscillatorMode::Forced);
        for _ in 0..10 {
            engine.tick(FRAME, &mut Recorder::new());
        }
        let step = 0.01 * engine.config().particle_speed;
        assert!(
            (engine.config().time - 10.0 * step).abs() < 1e-5,
            "{} particles -> t = {}",
            count,
            engine.config().time
        );
    }
}

#[test]
fn test_clock_holds_in_standard_mode_and_while_paused() {
    let mut engine = engine_with(10);
    engine.tick(FRAME, &mut Recorder::new());
    assert_eq!(engine.config().time, 0.0);

    engine.set_oscillator_mode(OscillatorMode::Forced);
    engine.tick(FRAME, &mut Recorder::new());
    let t = engine.config().time;
    engine.toggle_pause();
    for _ in 0..5 {
        engine.tick(FRAME, &mut Recorder::new());
    }
    assert_eq!(engine.config().time, t);
}

#[test]
fn test_mode_switch_and_reset_restart_clock() {
    let mut engine = engine_with(10);
    engine.set_oscillator_mode(OscillatorMode::Forced);
    for _ in 0..5 {
        engine.tick(FRAME, &mut Recorder::new());
    }
    engine.reset_particles();
    assert_eq!(engine.config().time, 0.0);

    engine.tick(FRAME, &mut Recorder::new());
    assert!(engine.config().time > 0.0);
    engine.set_oscillator_mode(OscillatorMode::Standard);
    assert_eq!(engine.config().time, 0.0);
}

// ============================================================================
// μ-sweep
// ============================================================================

#[test]
fn test_sweep_keeps_mu_in_range() {
    let mut engine = engine_with(10);
    engine.start_sweep(sweep(0.5, 1.5, 0.1, 10));
    for _ in 0..200 {
        engine.tick(FRAME, &mut Recorder::new());
        let mu = engine.config().mu;
        assert!((0.5..=1.5).contains(&mu), "mu = {mu}");
    }
}

#[test]
fn test_new_sweep_replaces_old() {
    let mut engine = engine_with(10);
    let first = engine.start_sweep(sweep(0.0, 5.0, 0.5, 10));
    let second = engine.start_sweep(sweep(2.0, 3.0, 0.1, 10));
    assert_ne!(first, second);
    assert_eq!(engine.active_sweep().map(|s| s.bottom()), Some(2.0));

    engine.tick(Duration::from_millis(10), &mut Recorder::new());
    assert!((2.0..=3.0).contains(&engine.config().mu));
}

#[test]
fn test_stop_sweep_is_idempotent() {
    let mut engine = engine_with(10);
    engine.start_sweep(sweep(0.0, 5.0, 0.5, 10));
    engine.stop_sweep();
    engine.stop_sweep();
    assert!(!engine.is_sweeping());

    let mu = engine.config().mu;
    engine.tick(Duration::from_millis(100), &mut Recorder::new());
    assert_eq!(engine.config().mu, mu);
}

#[test]
fn test_stale_handle_cannot_cancel_newer_sweep() {
    let mut engine = engine_with(10);
    let old = engine.start_sweep(sweep(0.0, 5.0, 0.5, 10));
    let new = engine.start_sweep(sweep(0.0, 5.0, 0.5, 10));

    assert!(!engine.cancel_sweep(old));
    assert!(engine.is_sweeping());
    assert!(engine.cancel_sweep(new));
    assert!(!engine.is_sweeping());
}

#[test]
fn test_sweep_runs_while_paused() {
    let mut engine = engine_with(10);
    engine.toggle_pause();
    engine.update_config(|c| c.mu = 1.0);
    engine.start_sweep(sweep(0.0, 5.0, 0.25, 20));
    engine.tick(Duration::from_millis(40), &mut Recorder::new());
    assert!((engine.config().mu - 1.5).abs() < 1e-5);
}

// ============================================================================
// Observers
// ============================================================================

#[derive(Default)]
struct Log {
    statuses: Vec<Status>,
    resized: Vec<usize>,
    pauses: Vec<bool>,
    resets: usize,
    view_resets: usize,
}

struct Recording(Rc<RefCell<Log>>);

impl FlowObserver for Recording {
    fn config_changed(&mut self, _config: &FlowConfig, status: &Status) {
        self.0.borrow_mut().statuses.push(*status);
    }

    fn particles_resized(&mut self, count: usize) {
        self.0.borrow_mut().resized.push(count);
    }

    fn pause_toggled(&mut self, paused: bool) {
        self.0.borrow_mut().pauses.push(paused);
    }

    fn particles_reset(&mut self) {
        self.0.borrow_mut().resets += 1;
    }

    fn view_reset(&mut self) {
        self.0.borrow_mut().view_resets += 1;
    }
}

#[test]
fn test_observer_sees_every_change() {
    let log = Rc::new(RefCell::new(Log::default()));
    let mut engine = engine_with(100);
    engine.add_observer(Recording(log.clone()));

    engine.update_config(|c| c.mu = 2.0);
    engine.set_particle_count(250);
    engine.toggle_pause();
    engine.reset_particles();
    engine.reset_view();

    let log = log.borrow();
    assert_eq!(log.statuses.len(), 5);
    assert_eq!(log.statuses[0].mu, 2.0);
    assert_eq!(log.statuses[1].particle_count, 250);
    assert_eq!(log.resized, vec![250]);
    assert_eq!(log.pauses, vec![true]);
    assert_eq!(log.resets, 1);
    assert_eq!(log.view_resets, 1);
}

#[test]
fn test_status_readout_after_zoom() {
    let mut engine = engine_with(5000);
    assert_eq!(
        engine.status().to_string(),
        "μ = 0.60 (Damping) · Particles: 5000 · Scale: 100"
    );

    engine.pointer_down(Vec2::new(400.0, 300.0));
    engine.pointer_move(Vec2::new(600.0, 400.0));
    engine.pointer_up();
    assert_eq!(engine.status().scale, 400.0);
}
