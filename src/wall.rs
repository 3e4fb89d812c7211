use serde::Serialize;

use crate::config::{WallConfig, WallOrient};
use crate::error::{ConfigError, Result};

/// Axis-aligned reflecting wall segment.
///
/// A horizontal wall sits at `y = coord` and spans `x` in `extent`; a
/// vertical wall sits at `x = coord` and spans `y` in `extent`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Wall {
    orient: WallOrient,
    coord: f64,
    extent: [f64; 2],
}

impl Wall {
    pub fn horizontal(y: f64, x: [f64; 2]) -> Self {
        Self {
            orient: WallOrient::Horizontal,
            coord: y,
            extent: x,
        }
    }

    pub fn vertical(x: f64, y: [f64; 2]) -> Self {
        Self {
            orient: WallOrient::Vertical,
            coord: x,
            extent: y,
        }
    }

    pub fn from_config(index: usize, config: &WallConfig) -> Result<Self> {
        let wall = match *config {
            WallConfig::Horizontal { x, y } => Self::horizontal(y, x),
            WallConfig::Vertical { x, y } => Self::vertical(x, y),
        };
        let malformed = |reason: String| ConfigError::MalformedWall { index, reason };
        if !wall.coord.is_finite() || !wall.extent.iter().all(|v| v.is_finite()) {
            return Err(malformed("coordinates must be finite".to_string()));
        }
        if wall.extent[0] > wall.extent[1] {
            return Err(malformed(format!(
                "extent [{}, {}] is reversed",
                wall.extent[0], wall.extent[1]
            )));
        }
        Ok(wall)
    }

    pub fn orient(&self) -> WallOrient {
        self.orient
    }

    pub fn coord(&self) -> f64 {
        self.coord
    }

    pub fn extent(&self) -> [f64; 2] {
        self.extent
    }

    /// End points `(x0, y0, x1, y1)`, for drawing.
    pub fn endpoints(&self) -> (f64, f64, f64, f64) {
        match self.orient {
            WallOrient::Horizontal => (self.extent[0], self.coord, self.extent[1], self.coord),
            WallOrient::Vertical => (self.coord, self.extent[0], self.coord, self.extent[1]),
        }
    }

    /// If the segment `from -> to` crosses this wall within its extent,
    /// return the landing point mirrored across the wall.
    pub fn bounce(&self, from: (f64, f64), to: (f64, f64)) -> Option<(f64, f64)> {
        // Work in (normal, tangential) coordinates so both orientations
        // share one code path.
        let (n1, t1, n2, t2) = match self.orient {
            WallOrient::Horizontal => (from.1, from.0, to.1, to.0),
            WallOrient::Vertical => (from.0, from.1, to.0, to.1),
        };
        let [lo, hi] = self.extent;

        if n1.min(n2) > self.coord || n1.max(n2) < self.coord {
            return None;
        }
        if t1.max(t2) < lo || t1.min(t2) > hi {
            return None;
        }
        // Segment crosses the infinite line; check the crossing lies on the span.
        if n1 != n2 {
            let slope = (t2 - t1) / (n2 - n1);
            let crossing = t1 + slope * (self.coord - n1);
            if !(lo..=hi).contains(&crossing) {
                return None;
            }
        }

        let mirrored = 2.0 * self.coord - n2;
        Some(match self.orient {
            WallOrient::Horizontal => (t2, mirrored),
            WallOrient::Vertical => (mirrored, t2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-12 && (a.1 - b.1).abs() < 1e-12
    }

    #[test]
    fn vertical_wall_mirrors_crossing_segment() {
        let wall = Wall::vertical(1.0, [0.0, 1.0]);
        let landing = wall.bounce((0.95, 0.5), (1.05, 0.52)).unwrap();
        assert!(close(landing, (0.95, 0.52)));
    }

    #[test]
    fn horizontal_wall_mirrors_crossing_segment() {
        let wall = Wall::horizontal(0.0, [0.0, 1.0]);
        let landing = wall.bounce((0.3, 0.02), (0.31, -0.03)).unwrap();
        assert!(close(landing, (0.31, 0.03)));
    }

    #[test]
    fn segment_short_of_the_wall_is_untouched() {
        let wall = Wall::vertical(1.0, [0.0, 1.0]);
        assert_eq!(wall.bounce((0.5, 0.5), (0.9, 0.5)), None);
    }

    #[test]
    fn crossing_the_infinite_line_outside_the_span_is_a_miss() {
        // Bounding boxes overlap the span, but the crossing point (y = 0.65)
        // lies beyond the wall's end at y = 0.6.
        let wall = Wall::vertical(0.5, [0.0, 0.6]);
        assert_eq!(wall.bounce((0.4, 0.55), (0.6, 0.75)), None);
        // Same motion against a longer wall bounces.
        let long = Wall::vertical(0.5, [0.0, 0.8]);
        assert!(close(long.bounce((0.4, 0.55), (0.6, 0.75)).unwrap(), (0.4, 0.75)));
    }

    #[test]
    fn segment_beside_the_span_is_rejected_early() {
        let wall = Wall::horizontal(0.5, [0.0, 0.3]);
        assert_eq!(wall.bounce((0.6, 0.4), (0.62, 0.6)), None);
    }

    #[test]
    fn motion_along_the_wall_line_reflects_in_place() {
        let wall = Wall::horizontal(1.0, [0.0, 1.0]);
        let landing = wall.bounce((0.2, 1.0), (0.3, 1.0)).unwrap();
        assert!(close(landing, (0.3, 1.0)));
    }

    #[test]
    fn straight_on_hit_lands_at_mirror_point() {
        let wall = Wall::horizontal(1.0, [0.0, 1.0]);
        let landing = wall.bounce((0.4, 0.99), (0.4, 1.01)).unwrap();
        assert!(close(landing, (0.4, 0.99)));
    }

    #[test]
    fn reversed_extent_is_malformed() {
        let config = WallConfig::Vertical {
            x: 0.5,
            y: [0.9, 0.1],
        };
        assert!(matches!(
            Wall::from_config(2, &config),
            Err(ConfigError::MalformedWall { index: 2, .. })
        ));
    }
}
