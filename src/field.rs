use std::f64::consts::TAU;

use crate::agent::Agent;
use crate::config::FIELD_BUFFER_POINTS;

/// Scalar "temperature" on a regular grid over the unit square padded by
/// one cell on every side, plus its negative gradient.
///
/// Cells are stored row-major: `values[row * n + col]`, row along `y`,
/// column along `x`.
pub struct TemperatureField {
    n: usize,
    coords: Vec<f64>,
    spacing: f64,
    values: Vec<f64>,
    grad_x: Vec<f64>,
    grad_y: Vec<f64>,
    spatial_decay: f64,
    linger: f64,
    intensity: f64,
}

impl TemperatureField {
    /// `n` must be at least 2 and `spatial_decay` positive; the
    /// configuration layer checks both.
    pub fn new(n: usize, spatial_decay: f64, linger: f64, intensity: f64) -> Self {
        let buffer = FIELD_BUFFER_POINTS as f64 / n as f64;
        let coords = linspace(-buffer, 1.0 + buffer, n);
        let spacing = coords[1] - coords[0];
        Self {
            n,
            coords,
            spacing,
            values: vec![0.0; n * n],
            grad_x: vec![0.0; n * n],
            grad_y: vec![0.0; n * n],
            spatial_decay,
            linger,
            intensity,
        }
    }

    /// Change kernel width, memory and intensity without touching the
    /// current values.
    pub fn set_params(&mut self, spatial_decay: f64, linger: f64, intensity: f64) {
        self.spatial_decay = spatial_decay;
        self.linger = linger;
        self.intensity = intensity;
    }

    pub fn resolution(&self) -> usize {
        self.n
    }

    /// Grid coordinates, shared by both axes.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn grad_x(&self) -> &[f64] {
        &self.grad_x
    }

    pub fn grad_y(&self) -> &[f64] {
        &self.grad_y
    }

    pub fn spatial_decay(&self) -> f64 {
        self.spatial_decay
    }

    pub fn linger(&self) -> f64 {
        self.linger
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Peak value of a single isolated hotspot.
    pub fn amplitude(&self) -> f64 {
        self.intensity / TAU.sqrt() / self.spatial_decay
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn value_at_cell(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.n + col]
    }

    /// Field value at the cell chosen by [`Self::cell_index`].
    pub fn lookup(&self, x: f64, y: f64) -> f64 {
        self.values[self.cell(x, y)]
    }

    /// Negative gradient (direction of steepest decrease) at the cell
    /// chosen by [`Self::cell_index`].
    pub fn gradient_at(&self, x: f64, y: f64) -> (f64, f64) {
        let idx = self.cell(x, y);
        (self.grad_x[idx], self.grad_y[idx])
    }

    /// First grid index whose coordinate is `>= v`. This is not
    /// round-to-nearest; reference traces depend on the bias.
    pub fn cell_index(&self, v: f64) -> usize {
        self.coords
            .iter()
            .position(|&c| c >= v)
            .unwrap_or(self.n - 1)
    }

    fn cell(&self, x: f64, y: f64) -> usize {
        self.cell_index(y) * self.n + self.cell_index(x)
    }

    /// Blend the decayed previous field with a Gaussian hotspot for every
    /// infected agent, then recompute the gradient.
    pub fn update(&mut self, agents: &[Agent]) {
        let n = self.n;
        let amplitude = self.amplitude();
        let inv_two_var = 0.5 / (self.spatial_decay * self.spatial_decay);

        for v in &mut self.values {
            *v *= self.linger;
        }

        for agent in agents.iter().filter(|a| a.is_infected()) {
            let (ax, ay) = agent.position();
            for (row, &y) in self.coords.iter().enumerate() {
                let dy2 = (y - ay) * (y - ay);
                let cells = &mut self.values[row * n..(row + 1) * n];
                for (cell, &x) in cells.iter_mut().zip(&self.coords) {
                    let dist2 = (x - ax) * (x - ax) + dy2;
                    *cell += amplitude * (-dist2 * inv_two_var).exp();
                }
            }
        }

        self.update_gradient();
    }

    // Central differences: grad_x on interior columns, grad_y on interior
    // rows. Edge columns (resp. rows) stay zero.
    fn update_gradient(&mut self) {
        let n = self.n;
        let scale = -0.5 / self.spacing;
        for row in 0..n {
            for col in 1..n.saturating_sub(1) {
                let idx = row * n + col;
                self.grad_x[idx] = scale * (self.values[idx + 1] - self.values[idx - 1]);
            }
        }
        for row in 1..n.saturating_sub(1) {
            for col in 0..n {
                let idx = row * n + col;
                self.grad_y[idx] = scale * (self.values[idx + n] - self.values[idx - n]);
            }
        }
    }
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
    if let Some(last) = points.last_mut() {
        *last = stop;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infected_at(x: f64, y: f64) -> Agent {
        let mut agent = Agent::new(x, y, 0.0, 0.0, 0.0, 1.0);
        agent.infect(0.0, 0.1, 1.0);
        agent
    }

    #[test]
    fn grid_is_padded_by_one_cell() {
        let field = TemperatureField::new(50, 0.1, 0.0, 1.0);
        let coords = field.coords();
        assert_eq!(coords.len(), 50);
        assert!((coords[0] + 0.02).abs() < 1e-12);
        assert_eq!(coords[49], 1.02);
        assert!((field.spacing() - 1.04 / 49.0).abs() < 1e-12);
    }

    #[test]
    fn lookup_uses_first_index_at_or_above_query() {
        let field = TemperatureField::new(11, 0.1, 0.0, 1.0);
        let coords = field.coords().to_vec();
        // Slightly above a grid point resolves to the next one up, even
        // though the lower point is much closer.
        assert_eq!(field.cell_index(coords[4] + 1e-9), 5);
        assert_eq!(field.cell_index(coords[4]), 4);
        assert_eq!(field.cell_index(-5.0), 0);
        assert_eq!(field.cell_index(5.0), 10);
    }

    #[test]
    fn no_infection_and_no_linger_gives_zero_field() {
        let mut field = TemperatureField::new(20, 0.1, 0.0, 1.0);
        field.update(&[infected_at(0.5, 0.5)]);
        assert!(field.max_value() > 0.0);

        field.update(&[Agent::new(0.5, 0.5, 0.0, 0.0, 0.0, 1.0)]);
        assert!(field.values().iter().all(|&v| v == 0.0));
        assert!(field.grad_x().iter().all(|&v| v == 0.0));
        assert!(field.grad_y().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn linger_decays_field_geometrically() {
        let mut field = TemperatureField::new(20, 0.1, 0.5, 1.0);
        field.update(&[infected_at(0.5, 0.5)]);
        let peak = field.max_value();
        field.update(&[]);
        assert!((field.max_value() - 0.5 * peak).abs() < 1e-12);
        field.update(&[]);
        assert!((field.max_value() - 0.25 * peak).abs() < 1e-12);
    }

    #[test]
    fn hotspot_peaks_at_agent_with_expected_amplitude() {
        let mut field = TemperatureField::new(51, 0.05, 0.0, 1.0);
        let target = field.coords()[25];
        field.update(&[infected_at(target, target)]);
        let expected = 1.0 / TAU.sqrt() / 0.05;
        assert!((field.value_at_cell(25, 25) - expected).abs() < 1e-9);
        assert!((field.max_value() - expected).abs() < 1e-9);
    }

    #[test]
    fn gradient_points_away_from_hotspot() {
        let mut field = TemperatureField::new(41, 0.1, 0.0, 1.0);
        field.update(&[infected_at(0.5, 0.5)]);
        let (gx, _) = field.gradient_at(0.8, 0.5);
        assert!(gx > 0.0);
        let (gx, _) = field.gradient_at(0.2, 0.5);
        assert!(gx < 0.0);
        let (_, gy) = field.gradient_at(0.5, 0.8);
        assert!(gy > 0.0);
    }

    #[test]
    fn edge_cells_keep_zero_gradient() {
        let n = 15;
        let mut field = TemperatureField::new(n, 0.3, 0.0, 1.0);
        field.update(&[infected_at(0.1, 0.1)]);
        for row in 0..n {
            assert_eq!(field.grad_x()[row * n], 0.0);
            assert_eq!(field.grad_x()[row * n + n - 1], 0.0);
        }
        for col in 0..n {
            assert_eq!(field.grad_y()[col], 0.0);
            assert_eq!(field.grad_y()[(n - 1) * n + col], 0.0);
        }
    }
}
