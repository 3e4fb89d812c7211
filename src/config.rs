// Tunable simulation constants and the typed run configuration.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};
use crate::sampler::{ParamSampler, Sampler};
use crate::wall::Wall;

// Health
pub const INCUBATION_THRESHOLD: f64 = 0.01;
pub const RECOVERED_HEALTH: f64 = 0.9;
pub const MIN_STORED_SEVERITY: f64 = 1.0;

// Immunity
pub const IMMUNITY_DECAY_PER_DAY: f64 = 0.02;
pub const IMMUNITY_MARGIN: f64 = 0.1;

// Field
pub const FIELD_BUFFER_POINTS: usize = 1;

// Calendar
pub const DAYS_PER_YEAR: f64 = 365.0;

// Run defaults
pub const DEFAULT_SEED: u64 = 333;
pub const DEFAULT_STEPS: usize = 365;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallOrient {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

/// A wall as written in JSON: `{"orient": "h", "x": [0, 1], "y": 0}` or
/// `{"orient": "v", "x": 0, "y": [0, 1]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "orient", deny_unknown_fields)]
pub enum WallConfig {
    #[serde(rename = "h")]
    Horizontal { x: [f64; 2], y: f64 },
    #[serde(rename = "v")]
    Vertical { x: f64, y: [f64; 2] },
}

impl WallConfig {
    /// The four walls enclosing the unit square.
    pub fn unit_square() -> Vec<WallConfig> {
        vec![
            WallConfig::Horizontal { x: [0.0, 1.0], y: 0.0 },
            WallConfig::Horizontal { x: [0.0, 1.0], y: 1.0 },
            WallConfig::Vertical { x: 0.0, y: [0.0, 1.0] },
            WallConfig::Vertical { x: 1.0, y: [0.0, 1.0] },
        ]
    }

    pub fn orient(&self) -> WallOrient {
        match self {
            WallConfig::Horizontal { .. } => WallOrient::Horizontal,
            WallConfig::Vertical { .. } => WallOrient::Vertical,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfectionConfig {
    /// Per-day chance that a susceptible agent is exposed; also the peak
    /// intensity each infected agent contributes to the field.
    pub infectiousness: f64,
    /// Fraction of the previous field kept on each update.
    pub linger: f64,
    /// Gaussian width of the hotspot around an infected agent.
    pub hotspot_radius: f64,
    pub incubation: Sampler,
    pub immunity: Sampler,
    pub healing_rate: Sampler,
    pub severity: Sampler,
    /// Amplitude of the yearly cosine modulation of infectiousness.
    pub seasonality: f64,
}

impl Default for InfectionConfig {
    fn default() -> Self {
        Self {
            infectiousness: 0.1,
            linger: 0.1,
            hotspot_radius: 0.04,
            incubation: Sampler::gaussian(0.0, 0.0),
            immunity: Sampler::gaussian(2.0, 0.0),
            healing_rate: Sampler::gaussian(0.1, 0.0),
            severity: Sampler::gaussian(1.0, 0.0),
            seasonality: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MobilityConfig {
    pub speed: Sampler,
    pub hypochondria: Sampler,
    pub walls: Vec<WallConfig>,
}

impl Default for MobilityConfig {
    fn default() -> Self {
        Self {
            speed: Sampler::gaussian(0.02, 0.0),
            hypochondria: Sampler::gaussian(0.05, 0.0),
            walls: WallConfig::unit_square(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    pub n_people: usize,
    pub gridsize: usize,
    pub initial_infection_fraction: f64,
    pub infection: InfectionConfig,
    pub mobility: MobilityConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_people: 100,
            gridsize: 200,
            initial_infection_fraction: 0.05,
            infection: InfectionConfig::default(),
            mobility: MobilityConfig::default(),
        }
    }
}

/// Partial update of [`InfectionConfig`]; absent keys keep their value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfectionUpdate {
    pub infectiousness: Option<f64>,
    pub linger: Option<f64>,
    pub hotspot_radius: Option<f64>,
    pub incubation: Option<Sampler>,
    pub immunity: Option<Sampler>,
    pub healing_rate: Option<Sampler>,
    pub severity: Option<Sampler>,
    pub seasonality: Option<f64>,
}

/// Partial update of [`MobilityConfig`]. `walls` replaces the wall list,
/// `+walls` appends to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MobilityUpdate {
    pub speed: Option<Sampler>,
    pub hypochondria: Option<Sampler>,
    pub walls: Option<Vec<WallConfig>>,
    #[serde(rename = "+walls", deserialize_with = "one_or_many_walls")]
    pub extra_walls: Option<Vec<WallConfig>>,
}

// `+walls` also takes a single wall, appended as a one-element list.
fn one_or_many_walls<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<WallConfig>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(WallConfig),
        Many(Vec<WallConfig>),
    }

    Ok(Some(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(wall) => vec![wall],
        OneOrMany::Many(walls) => walls,
    }))
}

/// Partial update of [`SimConfig`], as read from a JSON file or passed to
/// `Simulation::configure`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    pub n_people: Option<usize>,
    pub gridsize: Option<usize>,
    pub initial_infection_fraction: Option<f64>,
    pub infection: Option<InfectionUpdate>,
    pub mobility: Option<MobilityUpdate>,
}

impl ConfigUpdate {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

fn merge_field<T>(target: &mut T, update: Option<T>) {
    if let Some(value) = update {
        *target = value;
    }
}

impl InfectionConfig {
    pub fn merge(&mut self, update: InfectionUpdate) {
        merge_field(&mut self.infectiousness, update.infectiousness);
        merge_field(&mut self.linger, update.linger);
        merge_field(&mut self.hotspot_radius, update.hotspot_radius);
        merge_field(&mut self.incubation, update.incubation);
        merge_field(&mut self.immunity, update.immunity);
        merge_field(&mut self.healing_rate, update.healing_rate);
        merge_field(&mut self.severity, update.severity);
        merge_field(&mut self.seasonality, update.seasonality);
    }
}

impl MobilityConfig {
    pub fn merge(&mut self, update: MobilityUpdate) {
        merge_field(&mut self.speed, update.speed);
        merge_field(&mut self.hypochondria, update.hypochondria);
        merge_field(&mut self.walls, update.walls);
        if let Some(extra) = update.extra_walls {
            self.walls.extend(extra);
        }
    }
}

impl SimConfig {
    /// Defaults overlaid with the update in a JSON file, validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default().merged(ConfigUpdate::from_path(path)?);
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = Self::default().merged(ConfigUpdate::from_json_str(json)?);
        config.validate()?;
        Ok(config)
    }

    pub fn merge(&mut self, update: ConfigUpdate) {
        merge_field(&mut self.n_people, update.n_people);
        merge_field(&mut self.gridsize, update.gridsize);
        merge_field(
            &mut self.initial_infection_fraction,
            update.initial_infection_fraction,
        );
        if let Some(infection) = update.infection {
            self.infection.merge(infection);
        }
        if let Some(mobility) = update.mobility {
            self.mobility.merge(mobility);
        }
    }

    pub fn merged(mut self, update: ConfigUpdate) -> Self {
        self.merge(update);
        self
    }

    /// Check every parameter, including that each sampler can be built
    /// and each wall is well formed.
    pub fn validate(&self) -> Result<()> {
        self.build_walls()?;
        self.build_samplers()?;
        Ok(())
    }

    pub fn build_walls(&self) -> Result<Vec<Wall>> {
        self.mobility
            .walls
            .iter()
            .enumerate()
            .map(|(index, wall)| Wall::from_config(index, wall))
            .collect()
    }

    pub fn build_samplers(&self) -> Result<Samplers> {
        if self.n_people == 0 {
            return Err(ConfigError::InvalidPopulation(self.n_people));
        }
        if self.gridsize < 2 {
            return Err(ConfigError::InvalidGridSize(self.gridsize));
        }
        check_range(
            "initial_infection_fraction",
            "in [0, 1]",
            self.initial_infection_fraction,
            |v| (0.0..=1.0).contains(&v),
        )?;

        let inf = &self.infection;
        check_range("infectiousness", "finite and >= 0", inf.infectiousness, |v| {
            v.is_finite() && v >= 0.0
        })?;
        check_range("linger", "in [0, 1]", inf.linger, |v| (0.0..=1.0).contains(&v))?;
        check_range("hotspot_radius", "finite and > 0", inf.hotspot_radius, |v| {
            v.is_finite() && v > 0.0
        })?;
        check_range("seasonality", "finite", inf.seasonality, f64::is_finite)?;

        Ok(Samplers {
            incubation: inf.incubation.build("incubation")?,
            immunity: inf.immunity.build("immunity")?,
            healing_rate: inf.healing_rate.build("healing_rate")?,
            severity: inf.severity.build("severity")?,
            speed: self.mobility.speed.build("speed")?,
            hypochondria: self.mobility.hypochondria.build("hypochondria")?,
        })
    }
}

fn check_range(
    name: &'static str,
    expected: &'static str,
    value: f64,
    ok: impl Fn(f64) -> bool,
) -> Result<()> {
    if ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            expected,
            value,
        })
    }
}

/// Validated samplers for every per-agent parameter.
#[derive(Clone, Debug)]
pub struct Samplers {
    pub incubation: ParamSampler,
    pub immunity: ParamSampler,
    pub healing_rate: ParamSampler,
    pub severity: ParamSampler,
    pub speed: ParamSampler,
    pub hypochondria: ParamSampler,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn group_merge_keeps_untouched_keys() {
        let update = ConfigUpdate::from_json_str(
            r#"{"n_people": 250, "infection": {"linger": 0.5}, "mobility": {"speed": 0.03}}"#,
        )
        .unwrap();
        let config = SimConfig::default().merged(update);

        assert_eq!(config.n_people, 250);
        assert_eq!(config.infection.linger, 0.5);
        assert_eq!(config.infection.hotspot_radius, 0.04);
        assert_eq!(config.infection.immunity, Sampler::gaussian(2.0, 0.0));
        assert_eq!(config.mobility.speed, Sampler::Fixed(0.03));
        assert_eq!(config.mobility.walls.len(), 4);
    }

    #[test]
    fn plus_walls_appends_and_walls_replaces() {
        let divider = r#"{"orient": "v", "x": 0.5, "y": [0.0, 0.8]}"#;
        let append =
            ConfigUpdate::from_json_str(&format!(r#"{{"mobility": {{"+walls": [{divider}]}}}}"#))
                .unwrap();
        let config = SimConfig::default().merged(append);
        assert_eq!(config.mobility.walls.len(), 5);
        assert_eq!(
            config.mobility.walls[4],
            WallConfig::Vertical { x: 0.5, y: [0.0, 0.8] }
        );

        let replace =
            ConfigUpdate::from_json_str(&format!(r#"{{"mobility": {{"walls": [{divider}]}}}}"#))
                .unwrap();
        let config = config.merged(replace);
        assert_eq!(config.mobility.walls.len(), 1);
    }

    #[test]
    fn plus_walls_accepts_a_single_wall() {
        let update = ConfigUpdate::from_json_str(
            r#"{"mobility": {"+walls": {"orient": "h", "x": [0.0, 0.5], "y": 0.5}}}"#,
        )
        .unwrap();
        let config = SimConfig::default().merged(update);
        assert_eq!(config.mobility.walls.len(), 5);
        assert_eq!(
            config.mobility.walls[4],
            WallConfig::Horizontal { x: [0.0, 0.5], y: 0.5 }
        );
        config.validate().unwrap();
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let err = ConfigUpdate::from_json_str(r#"{"infection": {"infectiousnes": 0.2}}"#);
        assert!(matches!(err, Err(ConfigError::Parse(_))));
        let err = ConfigUpdate::from_json_str(r#"{"npeople": 10}"#);
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = SimConfig::default();
        config.n_people = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPopulation(0))
        ));

        let mut config = SimConfig::default();
        config.gridsize = 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGridSize(1))));

        let mut config = SimConfig::default();
        config.infection.hotspot_radius = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                name: "hotspot_radius",
                ..
            })
        ));

        let mut config = SimConfig::default();
        config.mobility.walls.push(WallConfig::Horizontal {
            x: [0.8, 0.2],
            y: 0.5,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MalformedWall { index: 4, .. })
        ));
    }

    #[test]
    fn json_round_trip_of_defaults_parses_back() {
        let json = serde_json::to_string(&SimConfig::default()).unwrap();
        let parsed: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, SimConfig::default());
    }
}
