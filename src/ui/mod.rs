pub mod graphs;
pub mod settings;
pub mod toolbar;

use infection::{EpidemicStats, SimConfig, Simulation};

/// Viewer controls and which panels are open.
pub struct UiState {
    pub paused: bool,
    pub step_requested: bool,
    pub restart_requested: bool,
    pub days_per_second: f32,
    pub show_velocities: bool,
    pub show_graphs: bool,
    pub show_settings: bool,
    pub settings: settings::SettingsDraft,
}

impl UiState {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            paused: false,
            step_requested: false,
            restart_requested: false,
            days_per_second: 10.0,
            show_velocities: false,
            show_graphs: true,
            show_settings: false,
            settings: settings::SettingsDraft::from_config(config),
        }
    }
}

/// Draw all egui UI panels.
pub fn draw_ui(sim: &mut Simulation, ui_state: &mut UiState, stats: &EpidemicStats) {
    egui_macroquad::ui(|ctx| {
        toolbar::draw_toolbar(ctx, sim, ui_state);

        if ui_state.show_graphs {
            graphs::draw_graphs(ctx, stats);
        }

        if ui_state.show_settings {
            settings::draw_settings(ctx, sim, ui_state);
        }
    });

    egui_macroquad::draw();
}
