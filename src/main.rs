use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;
use tracing::{error, info};

use infection::config::DEFAULT_SEED;
use infection::{EpidemicStats, SimConfig, Simulation};

mod renderer;
mod ui;

use ui::UiState;

/// Interactive epidemic viewer.
#[derive(Parser, Debug)]
#[command(name = "infection", version)]
struct Cli {
    /// JSON file with configuration overrides, merged over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random stream.
    #[arg(long = "random-seed", alias = "random_seed", default_value_t = DEFAULT_SEED)]
    random_seed: u64,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Infection".to_string(),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

const STATS_HISTORY: usize = 1000;

#[macroquad::main(window_conf)]
async fn main() {
    infection::init_tracing("info");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match SimConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), "could not load configuration: {e}");
                return;
            }
        },
        None => SimConfig::default(),
    };
    let mut sim = match Simulation::new(config, cli.random_seed) {
        Ok(sim) => sim,
        Err(e) => {
            error!("could not build simulation: {e}");
            return;
        }
    };

    let mut stats = EpidemicStats::new(STATS_HISTORY);
    stats.record(sim.day(), sim.state_counts());
    let mut ui_state = UiState::new(sim.config());
    let mut accumulator = 0.0f64;

    loop {
        accumulator += (get_frame_time() as f64).min(0.1);

        if is_key_pressed(KeyCode::Space) {
            ui_state.paused = !ui_state.paused;
        }

        let day_length = 1.0 / ui_state.days_per_second as f64;
        if !ui_state.paused {
            while accumulator >= day_length {
                sim.step();
                stats.record(sim.day(), sim.state_counts());
                accumulator -= day_length;
            }
        } else {
            accumulator = 0.0;
            if std::mem::take(&mut ui_state.step_requested) {
                sim.step();
                stats.record(sim.day(), sim.state_counts());
            }
        }

        if std::mem::take(&mut ui_state.restart_requested) {
            match Simulation::new(sim.config().clone(), sim.seed()) {
                Ok(fresh) => {
                    sim = fresh;
                    stats.clear();
                    stats.record(sim.day(), sim.state_counts());
                    info!(seed = sim.seed(), "restarted simulation");
                }
                Err(e) => error!("restart failed: {e}"),
            }
        }

        renderer::draw(&sim, ui_state.paused, ui_state.show_velocities);
        ui::draw_ui(&mut sim, &mut ui_state, &stats);

        next_frame().await;
    }
}
