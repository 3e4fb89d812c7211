use std::f64::consts::TAU;

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::agent::{Agent, HealthState};
use crate::config::{ConfigUpdate, Samplers, SimConfig, DAYS_PER_YEAR};
use crate::error::Result;
use crate::field::TemperatureField;
use crate::wall::Wall;

/// Aggregate counts reported after each day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: u64,
    pub n_infected: usize,
    pub n_immune: usize,
}

/// Per-state head count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub susceptible: usize,
    pub incubating: usize,
    pub symptomatic: usize,
    pub immune: usize,
}

/// Read-only view of the whole population, for dumping to JSON.
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub day: u64,
    pub seed: u64,
    pub agents: &'a [Agent],
    pub walls: &'a [Wall],
}

/// The epidemic engine: agents, the temperature field and the walls,
/// driven by a single seeded random stream.
pub struct Simulation {
    config: SimConfig,
    samplers: Samplers,
    agents: Vec<Agent>,
    field: TemperatureField,
    walls: Vec<Wall>,
    rng: ChaCha8Rng,
    seed: u64,
    day: u64,
}

impl Simulation {
    /// Validate `config`, then sample a fresh population and seed the
    /// initial cases. Nothing is built if validation fails.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self> {
        let mut sim = Self::empty(config, seed)?;
        let n = sim.config.n_people;
        let rng = &mut sim.rng;
        let samplers = &sim.samplers;

        let positions: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();
        let speeds: Vec<f64> = (0..n).map(|_| samplers.speed.sample(rng)).collect();
        let directions: Vec<f64> = (0..n).map(|_| TAU * rng.gen::<f64>()).collect();

        sim.agents = positions
            .into_iter()
            .zip(speeds)
            .zip(directions)
            .map(|(((x, y), speed), direction)| {
                let immunity = samplers.immunity.sample(rng);
                let hypochondria = samplers.hypochondria.sample(rng);
                Agent::new(x, y, speed, direction, hypochondria, immunity)
            })
            .collect();

        let n_seeded = (sim.config.initial_infection_fraction * n as f64) as usize;
        let seeded = index::sample(rng, n, n_seeded.min(n));
        let mut n_infected = 0;
        for idx in seeded.iter() {
            let (incubation, severity, healing_rate) = draw_infection_params(samplers, rng);
            if sim.agents[idx].attempt_infection(rng, incubation, healing_rate, severity, None) {
                n_infected += 1;
            }
        }

        info!(
            population = n,
            gridsize = sim.config.gridsize,
            seed,
            seeded = n_seeded,
            infected = n_infected,
            "initialized simulation"
        );
        Ok(sim)
    }

    /// Build around a caller-supplied population instead of sampling one.
    /// `n_people` is taken from `agents`.
    pub fn with_agents(config: SimConfig, seed: u64, agents: Vec<Agent>) -> Result<Self> {
        let mut sim = Self::empty(config, seed)?;
        sim.config.n_people = agents.len();
        sim.agents = agents;
        Ok(sim)
    }

    fn empty(config: SimConfig, seed: u64) -> Result<Self> {
        let walls = config.build_walls()?;
        let samplers = config.build_samplers()?;
        let inf = &config.infection;
        let field = TemperatureField::new(
            config.gridsize,
            inf.hotspot_radius,
            inf.linger,
            inf.infectiousness,
        );
        Ok(Self {
            config,
            samplers,
            agents: Vec::new(),
            field,
            walls,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            day: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn field(&self) -> &TemperatureField {
        &self.field
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            day: self.day,
            seed: self.seed,
            agents: &self.agents,
            walls: &self.walls,
        }
    }

    /// Daily exposure probability after the yearly seasonal swing. Only a
    /// positive seasonality modulates; zero or negative leaves the base
    /// infectiousness unchanged.
    pub fn effective_infectiousness(&self) -> f64 {
        let inf = &self.config.infection;
        if inf.seasonality <= 0.0 {
            return inf.infectiousness;
        }
        let phase = TAU * self.day as f64 / DAYS_PER_YEAR;
        inf.infectiousness * (1.0 + inf.seasonality * phase.cos())
    }

    /// Counts for the current state. Immune agents are those that are not
    /// infected and whose immunity beats the local field.
    pub fn summary(&self) -> DaySummary {
        let n_infected = self.agents.iter().filter(|a| a.is_infected()).count();
        let n_immune = self
            .agents
            .iter()
            .filter(|a| !a.is_infected() && a.is_immune(&self.field))
            .count();
        DaySummary {
            day: self.day,
            n_infected,
            n_immune,
        }
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for agent in &self.agents {
            match agent.state(&self.field) {
                HealthState::Susceptible => counts.susceptible += 1,
                HealthState::Incubating => counts.incubating += 1,
                HealthState::Symptomatic => counts.symptomatic += 1,
                HealthState::Immune => counts.immune += 1,
            }
        }
        counts
    }

    /// Advance one day.
    ///
    /// Order matters for reproducibility: health, infections against the
    /// previous day's field, steering, movement, field regeneration.
    pub fn step(&mut self) -> DaySummary {
        let infectiousness = self.effective_infectiousness();
        let Self {
            agents,
            field,
            walls,
            rng,
            samplers,
            ..
        } = self;

        for agent in agents.iter_mut() {
            agent.update_health();
        }

        for agent in agents.iter_mut() {
            if agent.is_infected() || agent.is_immune(field) {
                continue;
            }
            if rng.gen::<f64>() < infectiousness {
                let (incubation, severity, healing_rate) = draw_infection_params(samplers, rng);
                agent.attempt_infection(rng, incubation, healing_rate, severity, Some(&*field));
            }
        }

        for agent in agents.iter_mut() {
            agent.accelerate(field);
        }
        for agent in agents.iter_mut() {
            agent.move_step(walls);
        }

        field.update(agents);
        self.day += 1;

        let summary = self.summary();
        debug!(
            day = summary.day,
            infected = summary.n_infected,
            immune = summary.n_immune,
            "step"
        );
        summary
    }

    /// Lazily step `steps` days. Nothing is buffered; each `next()` runs
    /// exactly one step.
    pub fn run(&mut self, steps: usize) -> Run<'_> {
        Run {
            sim: self,
            remaining: steps,
        }
    }

    /// Apply a partial configuration mid-run. Agents, field values and the
    /// day counter are kept; walls and samplers are rebuilt and the field
    /// picks up its new parameters. On error nothing changes.
    pub fn configure(&mut self, update: ConfigUpdate) -> Result<()> {
        let next = self.config.clone().merged(update);
        let walls = next.build_walls()?;
        let samplers = next.build_samplers()?;

        if next.n_people != self.config.n_people {
            warn!(
                current = self.agents.len(),
                requested = next.n_people,
                "population size only applies to a new simulation"
            );
        }
        if next.gridsize != self.config.gridsize {
            warn!(
                current = self.field.resolution(),
                requested = next.gridsize,
                "grid size only applies to a new simulation"
            );
        }
        if next.initial_infection_fraction != self.config.initial_infection_fraction {
            warn!("initial infection fraction only applies to a new simulation");
        }

        let inf = &next.infection;
        self.field
            .set_params(inf.hotspot_radius, inf.linger, inf.infectiousness);
        self.walls = walls;
        self.samplers = samplers;
        self.config = next;
        info!(day = self.day, walls = self.walls.len(), "reconfigured simulation");
        Ok(())
    }
}

// Incubation is whole days, truncated toward zero.
fn draw_infection_params(samplers: &Samplers, rng: &mut ChaCha8Rng) -> (f64, f64, f64) {
    let incubation = samplers.incubation.sample(rng).trunc();
    let severity = samplers.severity.sample(rng);
    let healing_rate = samplers.healing_rate.sample(rng);
    (incubation, severity, healing_rate)
}

/// Iterator returned by [`Simulation::run`].
pub struct Run<'a> {
    sim: &'a mut Simulation,
    remaining: usize,
}

impl Run<'_> {
    /// The simulation as of the last yielded day.
    pub fn simulation(&self) -> &Simulation {
        self.sim
    }
}

impl Iterator for Run<'_> {
    type Item = DaySummary;

    fn next(&mut self) -> Option<DaySummary> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sim.step())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Run<'_> {}
