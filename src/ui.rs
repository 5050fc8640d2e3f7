//! egui control panel.

use crate::command::{UiCommand, MAX_MU, MAX_PARTICLES, MIN_PARTICLES};
use crate::config::{FlowConfig, OscillatorMode, SweepConfig, MAX_TRAIL_OPACITY};
use crate::observer::Status;

/// What the panel needs to know about the running simulation.
#[derive(Clone, Copy)]
pub struct PanelState<'a> {
    pub config: &'a FlowConfig,
    pub status: Status,
    pub sweeping: bool,
    pub fps: f32,
}

/// Floating window with every simulation control.
///
/// Widgets edit local copies of the values; any change is pushed as a
/// [`UiCommand`] for the host to apply after the egui pass.
#[derive(Debug, Default)]
pub struct ControlPanel {
    last_error: Option<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an error under the sweep controls until the next successful start.
    pub fn set_error(&mut self, message: Option<String>) {
        self.last_error = message;
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        state: PanelState<'_>,
        sweep: &mut SweepConfig,
        commands: &mut Vec<UiCommand>,
    ) {
        let config = state.config;
        egui::Window::new("Van der Pol Flow")
            .default_pos([12.0, 12.0])
            .default_width(300.0)
            .collapsible(true)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Drag to box-zoom · double-click to reset");
                ui.separator();

                let mut mu = config.mu;
                if ui
                    .add(egui::Slider::new(&mut mu, 0.0..=MAX_MU).step_by(0.01).text("μ"))
                    .changed()
                {
                    commands.push(UiCommand::SetMu(mu));
                }

                let mut count = config.particle_count;
                if ui
                    .add(
                        egui::Slider::new(&mut count, MIN_PARTICLES..=MAX_PARTICLES)
                            .step_by(50.0)
                            .text("Particles"),
                    )
                    .changed()
                {
                    commands.push(UiCommand::SetParticleCount(count));
                }

                let mut speed = config.particle_speed;
                if ui
                    .add(egui::Slider::new(&mut speed, 0.1..=4.0).step_by(0.1).text("Speed"))
                    .changed()
                {
                    commands.push(UiCommand::SetSpeed(speed));
                }

                let mut scale = config.slider_scale;
                if ui
                    .add(
                        egui::Slider::new(&mut scale, config.min_scale..=config.max_scale)
                            .step_by(10.0)
                            .logarithmic(true)
                            .text("Scale"),
                    )
                    .changed()
                {
                    commands.push(UiCommand::SetScale(scale));
                }

                let mut trail = config.trail_opacity;
                if ui
                    .add(
                        egui::Slider::new(&mut trail, 0.0..=MAX_TRAIL_OPACITY)
                            .step_by(0.001)
                            .text("Trail fade"),
                    )
                    .changed()
                {
                    commands.push(UiCommand::SetTrailOpacity(trail));
                }

                let mut color = config.color_speed;
                if ui.checkbox(&mut color, "Colour by speed").changed() {
                    commands.push(UiCommand::SetColorSpeed(color));
                }

                ui.horizontal(|ui| {
                    let pause_label = if config.paused { "Resume" } else { "Pause" };
                    if ui.button(pause_label).clicked() {
                        commands.push(UiCommand::TogglePause);
                    }
                    if ui.button("Reset").clicked() {
                        commands.push(UiCommand::Reset);
                    }
                    if ui.button("Reset View").clicked() {
                        commands.push(UiCommand::ResetView);
                    }
                    if ui.button("Fit View").clicked() {
                        commands.push(UiCommand::FitView);
                    }
                });

                ui.separator();
                ui.heading("Oscillator");
                let mut mode = config.oscillator_mode;
                ui.horizontal(|ui| {
                    ui.radio_value(&mut mode, OscillatorMode::Standard, "Standard");
                    ui.radio_value(&mut mode, OscillatorMode::Forced, "Forced");
                });
                if mode != config.oscillator_mode {
                    commands.push(UiCommand::SetMode(mode));
                }
                ui.add_enabled_ui(mode == OscillatorMode::Forced, |ui| {
                    let mut amplitude = config.force_amplitude;
                    if ui
                        .add(egui::Slider::new(&mut amplitude, 0.0..=3.0).step_by(0.01).text("A"))
                        .changed()
                    {
                        commands.push(UiCommand::SetForceAmplitude(amplitude));
                    }
                    let mut omega = config.force_omega;
                    if ui
                        .add(egui::Slider::new(&mut omega, 0.0..=5.0).step_by(0.01).text("ω"))
                        .changed()
                    {
                        commands.push(UiCommand::SetForceOmega(omega));
                    }
                    ui.label(format!("t = {:.2}", config.time));
                });

                ui.separator();
                ui.heading("μ sweep");
                egui::Grid::new("sweep_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Bottom");
                    ui.add(egui::DragValue::new(&mut sweep.bottom).speed(0.01).range(0.0..=MAX_MU));
                    ui.end_row();
                    ui.label("Top");
                    ui.add(egui::DragValue::new(&mut sweep.top).speed(0.01).range(0.0..=MAX_MU));
                    ui.end_row();
                    ui.label("Step");
                    ui.add(egui::DragValue::new(&mut sweep.step).speed(0.001).range(0.001..=1.0));
                    ui.end_row();
                    ui.label("Interval (ms)");
                    ui.add(egui::DragValue::new(&mut sweep.interval_ms).range(1..=2000));
                    ui.end_row();
                });
                ui.horizontal(|ui| {
                    if ui.button("Start").clicked() {
                        commands.push(UiCommand::StartSweep(sweep.clone()));
                    }
                    if ui.add_enabled(state.sweeping, egui::Button::new("Stop")).clicked() {
                        commands.push(UiCommand::StopSweep);
                    }
                    if state.sweeping {
                        ui.label("running");
                    }
                });
                if let Some(error) = &self.last_error {
                    ui.colored_label(egui::Color32::from_rgb(230, 110, 90), error);
                }

                ui.separator();
                ui.label(state.status.to_string());
                ui.small(format!("{:.0} fps", state.fps));
            });
    }
}
