//! Epidemic spread among mobile agents in the unit square, coupled to a
//! diffusing "temperature" field of infection pressure.
//!
//! ```no_run
//! use infection::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), 333)?;
//! for day in sim.run(30) {
//!     println!("{} {} {}", day.day, day.n_infected, day.n_immune);
//! }
//! # Ok::<(), infection::ConfigError>(())
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod field;
pub mod sampler;
pub mod simulation;
pub mod stats;
pub mod wall;

pub use agent::{Agent, HealthState};
pub use config::{ConfigUpdate, InfectionUpdate, MobilityUpdate, SimConfig, WallConfig};
pub use error::ConfigError;
pub use field::TemperatureField;
pub use sampler::{ParamSampler, Sampler};
pub use simulation::{DaySummary, Run, Simulation, Snapshot, StateCounts};
pub use stats::{EpidemicStats, RingBuffer, RunReport};
pub use wall::Wall;

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to
/// `default_level`. Safe to call more than once.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
