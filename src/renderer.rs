use macroquad::prelude::*;

use infection::{HealthState, Simulation, TemperatureField, Wall};

const BG_COLOR: Color = Color::new(0.02, 0.03, 0.08, 1.0);
const AGENT_RADIUS: f32 = 4.0;
// Field values at or above this many single-hotspot peaks saturate the heatmap.
const HEAT_SATURATION: f64 = 3.0;
// Top margin left free for the egui toolbar.
const TOP_MARGIN: f32 = 70.0;

/// Screen-space placement of the unit square.
#[derive(Clone, Copy)]
struct View {
    origin: Vec2,
    size: f32,
}

impl View {
    fn fit() -> Self {
        let margin = 20.0;
        let avail_w = screen_width() - 2.0 * margin;
        let avail_h = screen_height() - TOP_MARGIN - margin;
        let size = avail_w.min(avail_h).max(1.0);
        let origin = vec2(
            (screen_width() - size) * 0.5,
            TOP_MARGIN + (avail_h - size).max(0.0) * 0.5,
        );
        Self { origin, size }
    }

    // y grows upward in the simulation.
    fn to_screen(self, x: f64, y: f64) -> Vec2 {
        vec2(
            self.origin.x + x as f32 * self.size,
            self.origin.y + (1.0 - y as f32) * self.size,
        )
    }
}

pub fn draw(sim: &Simulation, paused: bool, show_velocities: bool) {
    clear_background(BG_COLOR);
    let view = View::fit();

    draw_field(sim.field(), view);
    draw_rectangle_lines(
        view.origin.x,
        view.origin.y,
        view.size,
        view.size,
        1.0,
        Color::new(0.15, 0.18, 0.25, 1.0),
    );
    draw_walls(sim.walls(), view);
    draw_agents(sim, view, show_velocities);
    draw_hud(sim, paused);
}

fn draw_field(field: &TemperatureField, view: View) {
    let n = field.resolution();
    let peak = field.amplitude() * HEAT_SATURATION;
    if peak <= 0.0 || field.max_value() <= 0.0 {
        return;
    }

    // Row 0 is the bottom of the grid; image row 0 is the top.
    let mut image = Image::gen_image_color(n as u16, n as u16, Color::new(0.0, 0.0, 0.0, 0.0));
    for row in 0..n {
        for col in 0..n {
            let heat = (field.value_at_cell(col, row) / peak).clamp(0.0, 1.0) as f32;
            if heat > 0.0 {
                image.set_pixel(col as u32, (n - 1 - row) as u32, heat_color(heat));
            }
        }
    }
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Linear);

    // Grid points span one spacing beyond each edge of the unit square.
    let coords = field.coords();
    let half = field.spacing() * 0.5;
    let top_left = view.to_screen(coords[0] - half, coords[n - 1] + half);
    let bottom_right = view.to_screen(coords[n - 1] + half, coords[0] - half);
    draw_texture_ex(
        &texture,
        top_left.x,
        top_left.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(bottom_right - top_left),
            ..Default::default()
        },
    );
}

fn heat_color(heat: f32) -> Color {
    Color::new(0.9 * heat + 0.1, 0.35 * heat, 0.1, 0.75 * heat)
}

fn draw_walls(walls: &[Wall], view: View) {
    for wall in walls {
        let (x0, y0, x1, y1) = wall.endpoints();
        let a = view.to_screen(x0, y0);
        let b = view.to_screen(x1, y1);
        draw_line(a.x, a.y, b.x, b.y, 3.0, Color::new(0.5, 0.5, 0.8, 0.9));
    }
}

fn state_color(state: HealthState) -> Color {
    match state {
        HealthState::Susceptible => Color::new(0.75, 0.8, 0.85, 0.9),
        HealthState::Incubating => Color::new(1.0, 0.8, 0.2, 0.95),
        HealthState::Symptomatic => Color::new(0.95, 0.25, 0.2, 1.0),
        HealthState::Immune => Color::new(0.2, 0.85, 0.4, 0.95),
    }
}

fn draw_agents(sim: &Simulation, view: View, show_velocities: bool) {
    let field = sim.field();
    for agent in sim.agents() {
        let (x, y) = agent.position();
        let pos = view.to_screen(x, y);
        let color = state_color(agent.state(field));

        if show_velocities {
            // Scaled so a typical day's step is visible.
            let (vx, vy) = agent.velocity();
            let tip = view.to_screen(x + vx * 3.0, y + vy * 3.0);
            draw_line(pos.x, pos.y, tip.x, tip.y, 1.0, Color::new(color.r, color.g, color.b, 0.5));
        }
        draw_circle(pos.x, pos.y, AGENT_RADIUS + 2.0, Color::new(color.r, color.g, color.b, 0.25));
        draw_circle(pos.x, pos.y, AGENT_RADIUS, color);
    }
}

fn draw_hud(sim: &Simulation, paused: bool) {
    let tc = Color::new(0.7, 0.75, 0.8, 1.0);
    let sh = Color::new(0.0, 0.0, 0.0, 0.5);
    let summary = sim.summary();

    let lines = [
        format!("FPS: {}", get_fps()),
        format!("Day: {}", sim.day()),
        format!("Infected: {}", summary.n_infected),
        format!("Immune: {}", summary.n_immune),
    ];
    let base_y = screen_height() - 20.0 * lines.len() as f32;
    for (i, text) in lines.iter().enumerate() {
        let y = base_y + 20.0 * i as f32;
        draw_text(text, 11.0, y + 1.0, 18.0, sh);
        draw_text(text, 10.0, y, 18.0, tc);
    }

    if paused {
        let pause_text = "PAUSED (Space to resume)";
        let tw = measure_text(pause_text, None, 24, 1.0).width;
        let x = screen_width() * 0.5 - tw * 0.5;
        let y = screen_height() - 20.0;
        draw_text(pause_text, x + 1.0, y + 1.0, 24.0, sh);
        draw_text(pause_text, x, y, 24.0, Color::new(1.0, 0.8, 0.2, 0.9));
    }
}
