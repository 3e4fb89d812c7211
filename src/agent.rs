use rand::Rng;
use serde::Serialize;

use crate::config::{
    WallOrient, IMMUNITY_DECAY_PER_DAY, IMMUNITY_MARGIN, INCUBATION_THRESHOLD,
    MIN_STORED_SEVERITY, RECOVERED_HEALTH,
};
use crate::field::TemperatureField;
use crate::wall::Wall;

/// Number of passes over the wall list when resolving one move.
pub const WALL_PASSES: usize = 2;

/// Coarse classification of an agent, for counting and drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HealthState {
    Susceptible,
    Incubating,
    Symptomatic,
    Immune,
}

/// One simulated person.
#[derive(Clone, Debug, Serialize)]
pub struct Agent {
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    mobility: f64,
    hypochondria: f64,
    health: f64,
    incubation: f64,
    severity: f64,
    healing_rate: f64,
    base_immunity: f64,
    immunity: f64,
    infected: bool,
    incubating: bool,
}

impl Agent {
    /// Healthy, susceptible agent heading at angle `direction`.
    pub fn new(
        x: f64,
        y: f64,
        mobility: f64,
        direction: f64,
        hypochondria: f64,
        base_immunity: f64,
    ) -> Self {
        Self {
            x,
            y,
            dx: direction.cos(),
            dy: direction.sin(),
            mobility,
            hypochondria,
            health: 1.0,
            incubation: 0.0,
            severity: 0.0,
            healing_rate: 0.0,
            base_immunity,
            immunity: 0.0,
            infected: false,
            incubating: false,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Heading vector. Not kept at unit length: steering accumulates.
    pub fn direction(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn set_direction(&mut self, dx: f64, dy: f64) {
        self.dx = dx;
        self.dy = dy;
    }

    pub fn mobility(&self) -> f64 {
        self.mobility
    }

    pub fn hypochondria(&self) -> f64 {
        self.hypochondria
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn healing_rate(&self) -> f64 {
        self.healing_rate
    }

    pub fn incubation_remaining(&self) -> f64 {
        self.incubation
    }

    pub fn base_immunity(&self) -> f64 {
        self.base_immunity
    }

    /// Current (decaying) immunity level.
    pub fn immunity(&self) -> f64 {
        self.immunity
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn is_incubating(&self) -> bool {
        self.incubating
    }

    /// Sick agents slow down.
    pub fn speed(&self) -> f64 {
        self.mobility * self.health
    }

    pub fn velocity(&self) -> (f64, f64) {
        let speed = self.speed();
        (self.dx * speed, self.dy * speed)
    }

    /// Immunity must beat the local field by [`IMMUNITY_MARGIN`]; a tie
    /// is not protection.
    pub fn is_immune(&self, field: &TemperatureField) -> bool {
        self.immunity > field.lookup(self.x, self.y) + IMMUNITY_MARGIN
    }

    pub fn state(&self, field: &TemperatureField) -> HealthState {
        if self.incubating {
            HealthState::Incubating
        } else if self.infected {
            HealthState::Symptomatic
        } else if self.is_immune(field) {
            HealthState::Immune
        } else {
            HealthState::Susceptible
        }
    }

    /// Advance the disease by one day and wear immunity down.
    pub fn update_health(&mut self) {
        if !self.infected {
            return;
        }
        if self.incubating {
            if self.incubation < INCUBATION_THRESHOLD {
                self.incubating = false;
                self.health = (1.0 - self.severity).clamp(0.0, 1.0);
            } else {
                self.incubation -= 1.0;
            }
        } else {
            self.health += self.healing_rate * (1.0 - self.health);
            if self.health >= RECOVERED_HEALTH {
                self.immunity = self.base_immunity.max(0.0);
                self.health = 1.0;
                self.infected = false;
            }
        }
        self.immunity = (self.immunity - IMMUNITY_DECAY_PER_DAY).max(0.0);
    }

    /// Roll once against `severity * (local temperature - immunity)` and
    /// infect on success. Without a field the local temperature is 1.
    /// Returns whether the agent was infected.
    pub fn attempt_infection<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        incubation: f64,
        healing_rate: f64,
        severity: f64,
        field: Option<&TemperatureField>,
    ) -> bool {
        let temperature = field.map_or(1.0, |f| f.lookup(self.x, self.y));
        let probability = severity * (temperature - self.immunity);
        if rng.gen::<f64>() < probability {
            self.infect(incubation, healing_rate, severity);
            true
        } else {
            false
        }
    }

    /// Start an infection unconditionally.
    pub fn infect(&mut self, incubation: f64, healing_rate: f64, severity: f64) {
        self.severity = severity.max(MIN_STORED_SEVERITY);
        self.healing_rate = healing_rate.clamp(0.0, 1.0);
        self.incubation = incubation;
        self.incubating = true;
        self.infected = true;
    }

    /// Healthy agents steer down the field gradient.
    pub fn accelerate(&mut self, field: &TemperatureField) {
        if self.infected {
            return;
        }
        let (gx, gy) = field.gradient_at(self.x, self.y);
        self.dx += self.hypochondria * gx;
        self.dy += self.hypochondria * gy;
    }

    /// Move by one day's displacement, bouncing off walls, then wrap into
    /// the unit square.
    pub fn move_step(&mut self, walls: &[Wall]) {
        let (vx, vy) = self.velocity();
        let from = (self.x, self.y);
        let mut to = (self.x + vx, self.y + vy);

        for _ in 0..WALL_PASSES {
            for wall in walls {
                if let Some(landing) = wall.bounce(from, to) {
                    to = landing;
                    match wall.orient() {
                        WallOrient::Horizontal => self.dy = -self.dy,
                        WallOrient::Vertical => self.dx = -self.dx,
                    }
                }
            }
        }

        self.x = wrap_unit(to.0);
        self.y = wrap_unit(to.1);
    }
}

/// Periodic wrap into `[0, 1)`. Non-finite input lands on 0.
pub fn wrap_unit(v: f64) -> f64 {
    let wrapped = v.rem_euclid(1.0);
    // rem_euclid rounds tiny negatives up to exactly 1.0
    if wrapped.is_finite() && wrapped < 1.0 {
        wrapped
    } else {
        0.0
    }
}
