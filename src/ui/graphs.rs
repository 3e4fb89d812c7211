use egui;

use infection::{EpidemicStats, RingBuffer};

const SUSCEPTIBLE: egui::Color32 = egui::Color32::from_rgb(190, 200, 215);
const INCUBATING: egui::Color32 = egui::Color32::from_rgb(255, 205, 50);
const SYMPTOMATIC: egui::Color32 = egui::Color32::from_rgb(240, 65, 50);
const IMMUNE: egui::Color32 = egui::Color32::from_rgb(50, 215, 100);

/// Head counts per health state over the recent days.
pub fn draw_graphs(ctx: &egui::Context, stats: &EpidemicStats) {
    egui::Window::new("Epidemic")
        .default_pos(egui::pos2(20.0, 420.0))
        .default_size(egui::vec2(400.0, 300.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.collapsing("All states", |ui| {
                let size = egui::vec2(ui.available_width(), 120.0);
                let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
                let rect = response.rect;
                painter.rect_filled(rect, 2.0, egui::Color32::from_gray(20));

                // One shared scale so the curves compare directly.
                let max_val = [
                    &stats.susceptible,
                    &stats.incubating,
                    &stats.symptomatic,
                    &stats.immune,
                ]
                .into_iter()
                .flat_map(|buf| buf.iter())
                .fold(1.0f32, f32::max);
                for (buffer, color) in [
                    (&stats.susceptible, SUSCEPTIBLE),
                    (&stats.incubating, INCUBATING),
                    (&stats.symptomatic, SYMPTOMATIC),
                    (&stats.immune, IMMUNE),
                ] {
                    draw_line_in_rect(&painter, buffer, rect, color, 0.0, max_val);
                }

                ui.horizontal(|ui| {
                    ui.colored_label(SUSCEPTIBLE, "Susceptible");
                    ui.colored_label(INCUBATING, "Incubating");
                    ui.colored_label(SYMPTOMATIC, "Symptomatic");
                    ui.colored_label(IMMUNE, "Immune");
                });
            });

            ui.collapsing("Symptomatic", |ui| {
                draw_line_graph(ui, &stats.symptomatic, SYMPTOMATIC);
            });

            ui.collapsing("Immune", |ui| {
                draw_line_graph(ui, &stats.immune, IMMUNE);
            });

            ui.separator();
            ui.label(format!(
                "Peak infected: {} on day {}",
                stats.peak_infected, stats.peak_day
            ));
        });
}

fn draw_line_graph(ui: &mut egui::Ui, buffer: &RingBuffer, color: egui::Color32) {
    let size = egui::vec2(ui.available_width(), 80.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 2.0, egui::Color32::from_gray(20));

    let max_val = buffer.iter().fold(1.0f32, f32::max);
    let min_val = buffer.iter().fold(max_val, f32::min);
    draw_line_in_rect(&painter, buffer, rect, color, min_val, max_val);

    if let Some(val) = buffer.last() {
        painter.text(
            egui::pos2(rect.right() - 4.0, rect.top() + 2.0),
            egui::Align2::RIGHT_TOP,
            format!("{val:.0}"),
            egui::FontId::proportional(10.0),
            egui::Color32::from_gray(200),
        );
    }
}

fn draw_line_in_rect(
    painter: &egui::Painter,
    buffer: &RingBuffer,
    rect: egui::Rect,
    color: egui::Color32,
    min_val: f32,
    max_val: f32,
) {
    let len = buffer.len();
    if len < 2 {
        return;
    }
    let range = (max_val - min_val).max(1.0);

    let points: Vec<egui::Pos2> = buffer
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = rect.left() + (i as f32 / (len - 1) as f32) * rect.width();
            let y = rect.bottom() - ((v - min_val) / range) * rect.height();
            egui::pos2(x, y)
        })
        .collect();

    for pair in points.windows(2) {
        painter.line_segment([pair[0], pair[1]], egui::Stroke::new(1.5, color));
    }
}
