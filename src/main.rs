use std::process::ExitCode;

use vdp_flow::{FlowPreset, Simulation, SimulationError};

fn run() -> Result<(), SimulationError> {
    let mut simulation = Simulation::new();

    if let Some(path) = std::env::args().nth(1) {
        log::info!("loading preset {path}");
        simulation = simulation.with_preset(FlowPreset::load(&path)?);
    }

    simulation.run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
