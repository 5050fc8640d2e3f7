//! Window host: simulation builder and the winit application.

use crate::command::UiCommand;
use crate::config::{FlowConfig, FlowPreset, SweepConfig};
use crate::engine::FlowEngine;
use crate::error::SimulationError;
use crate::gpu::{GpuState, ShapeBatch};
use crate::input::{Input, InputEvent};
use crate::observer::{FlowObserver, Status};
use crate::time::FrameClock;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;
#[cfg(feature = "egui")]
use crate::ui::{ControlPanel, PanelState};

/// A Van der Pol flow window builder.
///
/// ```ignore
/// Simulation::new()
///     .with_config(FlowConfig { mu: 2.0, ..Default::default() })
///     .with_sweep(SweepConfig::default())
///     .run()?;
/// ```
pub struct Simulation {
    config: FlowConfig,
    sweep: SweepConfig,
    sweep_on_start: bool,
    seed: Option<u64>,
    title: String,
    window_size: (u32, u32),
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            config: FlowConfig::default(),
            sweep: SweepConfig::default(),
            sweep_on_start: false,
            seed: None,
            title: "Van der Pol Flow".to_string(),
            window_size: (1280, 800),
        }
    }

    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Take config, sweep and seed from a preset.
    pub fn with_preset(mut self, preset: FlowPreset) -> Self {
        self.config = preset.config;
        if let Some(sweep) = preset.sweep {
            self = self.with_sweep(sweep);
        }
        self.seed = preset.seed.or(self.seed);
        self
    }

    /// Start a μ-sweep with these settings as soon as the window opens.
    pub fn with_sweep(mut self, sweep: SweepConfig) -> Self {
        self.sweep = sweep;
        self.sweep_on_start = true;
        self
    }

    /// Fix the particle placement seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;
        if self.sweep_on_start {
            self.sweep.build()?;
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors the status readout into the window title.
struct TitleObserver {
    window: Arc<Window>,
    title: String,
}

impl FlowObserver for TitleObserver {
    fn config_changed(&mut self, _config: &FlowConfig, status: &Status) {
        self.window.set_title(&format!("{} · {}", self.title, status));
    }

    fn pause_toggled(&mut self, paused: bool) {
        log::info!("{}", if paused { "paused" } else { "resumed" });
    }

    fn particles_reset(&mut self) {
        log::debug!("particles reseeded");
    }

    fn view_reset(&mut self) {
        log::debug!("view reset");
    }
}

struct App {
    settings: Simulation,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    engine: Option<FlowEngine>,
    input: Input,
    clock: FrameClock,
    batch: ShapeBatch,
    pending: Vec<UiCommand>,
    error: Option<SimulationError>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    panel: ControlPanel,
}

impl App {
    fn new(settings: Simulation) -> Self {
        Self {
            settings,
            window: None,
            gpu_state: None,
            engine: None,
            input: Input::new(),
            clock: FrameClock::new(),
            batch: ShapeBatch::new(),
            pending: Vec::new(),
            error: None,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            panel: ControlPanel::new(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let (width, height) = self.settings.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu_state = pollster::block_on(GpuState::new(window.clone()))?;
        let size = window.inner_size();

        let config = self.settings.config.clone();
        let mut engine = match self.settings.seed {
            Some(seed) => FlowEngine::with_seed(config, size.width as f32, size.height as f32, seed),
            None => FlowEngine::new(config, size.width as f32, size.height as f32),
        };
        let mut title = TitleObserver {
            window: window.clone(),
            title: self.settings.title.clone(),
        };
        title.config_changed(engine.config(), &engine.status());
        engine.add_observer(title);

        if self.settings.sweep_on_start {
            engine.start_sweep(self.settings.sweep.build()?);
        }

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                gpu_state.device(),
                gpu_state.surface_format(),
                &window,
            ));
        }

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        self.engine = Some(engine);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        self.error = Some(error);
        event_loop.exit();
    }

    /// Returns `true` if egui took the event.
    #[cfg(feature = "egui")]
    fn egui_event(&mut self, event: &WindowEvent) -> bool {
        match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, event),
            _ => false,
        }
    }

    #[cfg(not(feature = "egui"))]
    fn egui_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    #[cfg(feature = "egui")]
    fn egui_wants_pointer(&self) -> bool {
        self.egui.as_ref().is_some_and(|e| e.wants_pointer())
    }

    #[cfg(not(feature = "egui"))]
    fn egui_wants_pointer(&self) -> bool {
        false
    }

    fn handle_input(&mut self, event: &WindowEvent, egui_consumed: bool) {
        let mut events = Vec::new();
        self.input.handle_event(event, |e| events.push(e));
        let egui_pointer = self.egui_wants_pointer();

        let Some(engine) = &mut self.engine else {
            return;
        };
        for input in events {
            match input {
                InputEvent::KeyPressed(key) => {
                    if egui_consumed {
                        continue;
                    }
                    if let Some(command) = UiCommand::from_key(key) {
                        self.pending.push(command);
                    }
                }
                InputEvent::PointerDown(at) => {
                    if !egui_pointer {
                        engine.pointer_down(at);
                    }
                }
                InputEvent::PointerMove(to) => engine.pointer_move(to),
                InputEvent::PointerUp(_) => {
                    engine.pointer_up();
                }
                InputEvent::DoubleClick(_) => {
                    if !egui_pointer {
                        engine.double_click();
                    }
                }
            }
        }
    }

    fn apply_pending(&mut self) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        for command in self.pending.drain(..) {
            let result = command.apply(engine, &self.settings.sweep);
            #[cfg(feature = "egui")]
            {
                self.panel
                    .set_error(result.as_ref().err().map(|e| e.to_string()));
            }
            if let Err(e) = result {
                log::warn!("{e}");
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_pending();

        let (Some(engine), Some(gpu_state), Some(window)) =
            (&mut self.engine, &mut self.gpu_state, &self.window)
        else {
            return;
        };

        let dt = self.clock.tick();
        self.batch.clear();
        engine.tick(dt, &mut self.batch);

        #[cfg(feature = "egui")]
        let result = {
            let egui = self.egui.as_mut();
            match egui {
                Some(egui) => {
                    let panel = &mut self.panel;
                    let sweep = &mut self.settings.sweep;
                    let pending = &mut self.pending;
                    let state = PanelState {
                        config: engine.config(),
                        status: engine.status(),
                        sweeping: engine.is_sweeping(),
                        fps: self.clock.fps(),
                    };
                    let frame = egui.run(window, |ctx| panel.show(ctx, state, sweep, pending));
                    gpu_state.render(&self.batch, Some((egui, &frame)))
                }
                None => gpu_state.render(&self.batch, None),
            }
        };
        #[cfg(not(feature = "egui"))]
        let result = gpu_state.render(&self.batch);

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                gpu_state.reconfigure()
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {e:?}"),
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let egui_consumed = self.egui_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if let Some(engine) = &mut self.engine {
                    engine.resize(physical_size.width as f32, physical_size.height as f32);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.handle_input(&other, egui_consumed),
        }
    }
}
