use egui;

use super::UiState;
use infection::Simulation;

/// Slim status strip + compact controls.
pub fn draw_toolbar(ctx: &egui::Context, sim: &Simulation, ui_state: &mut UiState) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.add_space(3.0);
        ui.horizontal_wrapped(|ui| {
            title_badge(ui, "INFECTION");

            ui.separator();
            compact_group(ui, "Sim", |ui| {
                let pause_label = if ui_state.paused { "Play" } else { "Pause" };
                if ui.button(pause_label).clicked() {
                    ui_state.paused = !ui_state.paused;
                }
                if ui.add_enabled(ui_state.paused, egui::Button::new("Step")).clicked() {
                    ui_state.step_requested = true;
                }
                if ui.button("Restart").clicked() {
                    ui_state.restart_requested = true;
                }
            });

            compact_group(ui, "Days/s", |ui| {
                for rate in [1.0, 5.0, 10.0, 30.0, 60.0] {
                    rate_button(ui, ui_state, rate);
                }
            });

            compact_group(ui, "Panels", |ui| {
                ui.toggle_value(&mut ui_state.show_graphs, "Graphs");
                ui.toggle_value(&mut ui_state.show_settings, "Settings");
                ui.toggle_value(&mut ui_state.show_velocities, "Velocity");
            });
        });

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            let counts = sim.state_counts();
            metric_chip(ui, "Day", format!("{}", sim.day()));
            metric_chip(ui, "Seed", format!("{}", sim.seed()));
            metric_chip(ui, "Susceptible", format!("{}", counts.susceptible));
            metric_chip(ui, "Incubating", format!("{}", counts.incubating));
            metric_chip(ui, "Symptomatic", format!("{}", counts.symptomatic));
            metric_chip(ui, "Immune", format!("{}", counts.immune));
            metric_chip(
                ui,
                "Infectiousness",
                format!("{:.3}", sim.effective_infectiousness()),
            );
            if counts.incubating + counts.symptomatic == 0 && sim.day() > 0 {
                status_chip(ui, "OUTBREAK OVER", egui::Color32::from_rgb(98, 191, 140));
            }
        });
        ui.add_space(3.0);
    });
}

fn rate_button(ui: &mut egui::Ui, ui_state: &mut UiState, rate: f32) {
    let label = format!("{rate}");
    let selected = (ui_state.days_per_second - rate).abs() < 0.01;
    if ui.selectable_label(selected, label).clicked() {
        ui_state.days_per_second = rate;
    }
}

fn title_badge(ui: &mut egui::Ui, label: &str) {
    let text = egui::RichText::new(label)
        .strong()
        .color(egui::Color32::from_rgb(190, 220, 255));
    ui.label(text);
}

fn compact_group(ui: &mut egui::Ui, heading: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(heading)
                    .small()
                    .color(egui::Color32::from_rgb(150, 170, 185)),
            );
            add_contents(ui);
        });
    });
}

fn metric_chip(ui: &mut egui::Ui, key: &str, value: String) {
    let text = egui::RichText::new(format!("{key}: {value}"))
        .small()
        .color(egui::Color32::from_rgb(205, 215, 225));
    ui.group(|ui| {
        ui.label(text);
    });
}

fn status_chip(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
    ui.group(|ui| {
        ui.label(egui::RichText::new(label).small().strong().color(color));
    });
}
