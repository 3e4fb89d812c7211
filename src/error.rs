use thiserror::Error;

/// Everything that can go wrong while building or reconfiguring a simulation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population must be at least 1 (got {0})")]
    InvalidPopulation(usize),

    #[error("grid size must be at least 2 (got {0})")]
    InvalidGridSize(usize),

    #[error("{name} must be {expected} (got {value})")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("malformed wall #{index}: {reason}")]
    MalformedWall { index: usize, reason: String },

    #[error("sampler `{0}` has an empty choice list")]
    EmptyChoices(&'static str),

    #[error("sampler `{param}` names unknown distribution `{name}`")]
    UnknownDistribution { param: &'static str, name: String },

    #[error("sampler `{param}` has invalid {distribution} parameters: {reason}")]
    InvalidDistribution {
        param: &'static str,
        distribution: &'static str,
        reason: String,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
