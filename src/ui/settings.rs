use egui;
use tracing::warn;

use super::UiState;
use infection::{ConfigUpdate, InfectionUpdate, SimConfig, Simulation};

/// Slider values not yet applied to the running simulation.
pub struct SettingsDraft {
    pub infectiousness: f64,
    pub linger: f64,
    pub hotspot_radius: f64,
    pub seasonality: f64,
    pub n_people: usize,
    pub gridsize: usize,
    pub initial_infection_fraction: f64,
    pub last_error: Option<String>,
}

impl SettingsDraft {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            infectiousness: config.infection.infectiousness,
            linger: config.infection.linger,
            hotspot_radius: config.infection.hotspot_radius,
            seasonality: config.infection.seasonality,
            n_people: config.n_people,
            gridsize: config.gridsize,
            initial_infection_fraction: config.initial_infection_fraction,
            last_error: None,
        }
    }

    fn to_update(&self) -> ConfigUpdate {
        ConfigUpdate {
            n_people: Some(self.n_people),
            gridsize: Some(self.gridsize),
            initial_infection_fraction: Some(self.initial_infection_fraction),
            infection: Some(InfectionUpdate {
                infectiousness: Some(self.infectiousness),
                linger: Some(self.linger),
                hotspot_radius: Some(self.hotspot_radius),
                seasonality: Some(self.seasonality),
                ..Default::default()
            }),
            mobility: None,
        }
    }
}

/// Runtime settings panel for tuning simulation parameters.
pub fn draw_settings(ctx: &egui::Context, sim: &mut Simulation, ui_state: &mut UiState) {
    let draft = &mut ui_state.settings;
    let mut restart = false;

    egui::Window::new("Settings")
        .default_pos(egui::pos2(860.0, 80.0))
        .default_size(egui::vec2(280.0, 360.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Infection");
            ui.add(egui::Slider::new(&mut draft.infectiousness, 0.0..=1.0).text("infectiousness"));
            ui.add(egui::Slider::new(&mut draft.linger, 0.0..=1.0).text("linger"));
            ui.add(
                egui::Slider::new(&mut draft.hotspot_radius, 0.005..=0.25)
                    .logarithmic(true)
                    .text("hotspot radius"),
            );
            ui.add(egui::Slider::new(&mut draft.seasonality, 0.0..=1.0).text("seasonality"));

            ui.separator();
            ui.heading("Population");
            ui.label(
                egui::RichText::new("Takes effect on restart")
                    .small()
                    .color(egui::Color32::from_rgb(150, 170, 185)),
            );
            ui.add(egui::Slider::new(&mut draft.n_people, 1..=2000).text("people"));
            ui.add(egui::Slider::new(&mut draft.gridsize, 2..=400).text("grid size"));
            ui.add(
                egui::Slider::new(&mut draft.initial_infection_fraction, 0.0..=1.0)
                    .text("initially infected"),
            );

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    apply(sim, draft);
                }
                if ui.button("Apply + Restart").clicked() && apply(sim, draft) {
                    restart = true;
                }
                if ui.button("Revert").clicked() {
                    *draft = SettingsDraft::from_config(sim.config());
                }
            });

            if let Some(err) = &draft.last_error {
                ui.colored_label(egui::Color32::from_rgb(255, 100, 100), err.as_str());
            }

            ui.separator();
            ui.heading("Info");
            ui.label(format!("Walls: {}", sim.walls().len()));
            ui.label(format!(
                "Field grid: {0}x{0}, peak {1:.3}",
                sim.field().resolution(),
                sim.field().max_value()
            ));
        });

    if restart {
        ui_state.restart_requested = true;
    }
}

fn apply(sim: &mut Simulation, draft: &mut SettingsDraft) -> bool {
    match sim.configure(draft.to_update()) {
        Ok(()) => {
            draft.last_error = None;
            true
        }
        Err(e) => {
            warn!("settings rejected: {e}");
            draft.last_error = Some(e.to_string());
            false
        }
    }
}
