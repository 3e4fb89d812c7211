use std::fmt::Display;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::{Beta, Exp, Gamma, LogNormal, Normal, Triangular};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// How a per-agent parameter is drawn, as written in a configuration file.
///
/// Accepted JSON forms:
/// - `0.02` always yields that value,
/// - `[0.01, 0.02, 0.04]` picks one entry uniformly,
/// - `{"mean": 0.02, "sigma": 0.005}` is a normal distribution,
/// - `{"distribution": "gamma", "shape": 2.0, "scale": 0.5}` names any
///   supported distribution explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sampler {
    Fixed(f64),
    Choice(Vec<f64>),
    Named(NamedDistribution),
    Gaussian(MeanSigma),
    Unrecognized(UnknownDistribution),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeanSigma {
    pub mean: f64,
    pub sigma: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "lowercase", deny_unknown_fields)]
pub enum NamedDistribution {
    Normal { mean: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Exponential { lambda: f64 },
    Gamma { shape: f64, scale: f64 },
    Beta { alpha: f64, beta: f64 },
    Triangular { min: f64, max: f64, mode: f64 },
}

/// Catch-all so an unknown distribution name surfaces as a proper
/// configuration error instead of an opaque "no variant matched".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnknownDistribution {
    pub distribution: String,
}

const KNOWN_DISTRIBUTIONS: &[&str] = &[
    "normal",
    "uniform",
    "lognormal",
    "exponential",
    "gamma",
    "beta",
    "triangular",
];

impl Sampler {
    pub const fn fixed(value: f64) -> Self {
        Sampler::Fixed(value)
    }

    pub const fn gaussian(mean: f64, sigma: f64) -> Self {
        Sampler::Gaussian(MeanSigma { mean, sigma })
    }

    /// Validate parameters and produce a sampler ready to draw from.
    /// `param` only labels error messages.
    pub fn build(&self, param: &'static str) -> Result<ParamSampler> {
        match self {
            Sampler::Fixed(value) => {
                ensure_finite(param, *value)?;
                Ok(ParamSampler::Fixed(*value))
            }
            Sampler::Choice(choices) => {
                if choices.is_empty() {
                    return Err(ConfigError::EmptyChoices(param));
                }
                for value in choices {
                    ensure_finite(param, *value)?;
                }
                Ok(ParamSampler::Choice(choices.clone()))
            }
            Sampler::Gaussian(MeanSigma { mean, sigma }) => build_normal(param, *mean, *sigma),
            Sampler::Named(named) => build_named(param, *named),
            Sampler::Unrecognized(UnknownDistribution { distribution }) => {
                if KNOWN_DISTRIBUTIONS.contains(&distribution.to_ascii_lowercase().as_str()) {
                    Err(ConfigError::InvalidDistribution {
                        param,
                        distribution: "named",
                        reason: format!("missing or unexpected parameters for `{distribution}`"),
                    })
                } else {
                    Err(ConfigError::UnknownDistribution {
                        param,
                        name: distribution.clone(),
                    })
                }
            }
        }
    }
}

fn ensure_finite(param: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name: param,
            expected: "a finite number",
            value,
        })
    }
}

fn invalid(param: &'static str, distribution: &'static str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidDistribution {
        param,
        distribution,
        reason: reason.to_string(),
    }
}

// rand_distr lets several degenerate parameters through (negative sigma,
// zero rate), so every constraint is checked here before construction.
fn require(
    param: &'static str,
    distribution: &'static str,
    ok: bool,
    reason: impl FnOnce() -> String,
) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(invalid(param, distribution, reason()))
    }
}

fn build_normal(param: &'static str, mean: f64, sigma: f64) -> Result<ParamSampler> {
    ensure_finite(param, mean)?;
    require(param, "normal", sigma.is_finite() && sigma >= 0.0, || {
        format!("sigma must be finite and >= 0 (got {sigma})")
    })?;
    Normal::new(mean, sigma)
        .map(ParamSampler::Normal)
        .map_err(|e| invalid(param, "normal", e))
}

fn build_named(param: &'static str, named: NamedDistribution) -> Result<ParamSampler> {
    match named {
        NamedDistribution::Normal { mean, sigma } => build_normal(param, mean, sigma),
        NamedDistribution::Uniform { low, high } => {
            // rand's Uniform panics on these instead of returning an error.
            require(
                param,
                "uniform",
                low.is_finite() && high.is_finite() && (high - low).is_finite() && low < high,
                || format!("need finite low < high (got {low}..{high})"),
            )?;
            Ok(ParamSampler::Uniform(Uniform::new(low, high)))
        }
        NamedDistribution::LogNormal { mu, sigma } => {
            ensure_finite(param, mu)?;
            require(param, "lognormal", sigma.is_finite() && sigma >= 0.0, || {
                format!("sigma must be finite and >= 0 (got {sigma})")
            })?;
            LogNormal::new(mu, sigma)
                .map(ParamSampler::LogNormal)
                .map_err(|e| invalid(param, "lognormal", e))
        }
        NamedDistribution::Exponential { lambda } => {
            // A zero rate draws infinity.
            require(param, "exponential", lambda.is_finite() && lambda > 0.0, || {
                format!("lambda must be finite and > 0 (got {lambda})")
            })?;
            Exp::new(lambda)
                .map(ParamSampler::Exponential)
                .map_err(|e| invalid(param, "exponential", e))
        }
        NamedDistribution::Gamma { shape, scale } => {
            require(
                param,
                "gamma",
                shape.is_finite() && shape > 0.0 && scale.is_finite() && scale > 0.0,
                || format!("shape and scale must be finite and > 0 (got {shape}, {scale})"),
            )?;
            Gamma::new(shape, scale)
                .map(ParamSampler::Gamma)
                .map_err(|e| invalid(param, "gamma", e))
        }
        NamedDistribution::Beta { alpha, beta } => {
            require(
                param,
                "beta",
                alpha.is_finite() && alpha > 0.0 && beta.is_finite() && beta > 0.0,
                || format!("alpha and beta must be finite and > 0 (got {alpha}, {beta})"),
            )?;
            Beta::new(alpha, beta)
                .map(ParamSampler::Beta)
                .map_err(|e| invalid(param, "beta", e))
        }
        NamedDistribution::Triangular { min, max, mode } => {
            require(
                param,
                "triangular",
                min.is_finite() && max.is_finite() && min <= mode && mode <= max && min < max,
                || format!("need finite min <= mode <= max with min < max (got {min}, {mode}, {max})"),
            )?;
            Triangular::new(min, max, mode)
                .map(ParamSampler::Triangular)
                .map_err(|e| invalid(param, "triangular", e))
        }
    }
}

/// A validated sampler. Drawing never fails.
#[derive(Clone, Debug)]
pub enum ParamSampler {
    Fixed(f64),
    Choice(Vec<f64>),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    LogNormal(LogNormal<f64>),
    Exponential(Exp<f64>),
    Gamma(Gamma<f64>),
    Beta(Beta<f64>),
    Triangular(Triangular<f64>),
}

impl ParamSampler {
    /// Draw one value. `Fixed` consumes no randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ParamSampler::Fixed(value) => *value,
            ParamSampler::Choice(choices) => choices[rng.gen_range(0..choices.len())],
            ParamSampler::Normal(d) => d.sample(rng),
            ParamSampler::Uniform(d) => d.sample(rng),
            ParamSampler::LogNormal(d) => d.sample(rng),
            ParamSampler::Exponential(d) => d.sample(rng),
            ParamSampler::Gamma(d) => d.sample(rng),
            ParamSampler::Beta(d) => d.sample(rng),
            ParamSampler::Triangular(d) => d.sample(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parse(json: &str) -> Sampler {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn json_forms_map_to_expected_variants() {
        assert_eq!(parse("0.25"), Sampler::Fixed(0.25));
        assert_eq!(parse("[1, 2, 3]"), Sampler::Choice(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse(r#"{"mean": 2, "sigma": 0}"#), Sampler::gaussian(2.0, 0.0));
        assert_eq!(
            parse(r#"{"distribution": "gamma", "shape": 2, "scale": 0.5}"#),
            Sampler::Named(NamedDistribution::Gamma {
                shape: 2.0,
                scale: 0.5
            })
        );
    }

    #[test]
    fn fixed_sampler_consumes_no_randomness() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut reference = rng.clone();
        let sampler = Sampler::fixed(0.3).build("speed").unwrap();
        assert_eq!(sampler.sample(&mut rng), 0.3);
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn choice_only_yields_listed_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sampler = parse("[0.1, 0.5, 0.9]").build("speed").unwrap();
        for _ in 0..200 {
            let v = sampler.sample(&mut rng);
            assert!(v == 0.1 || v == 0.5 || v == 0.9);
        }
    }

    #[test]
    fn zero_sigma_gaussian_returns_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sampler = Sampler::gaussian(0.02, 0.0).build("speed").unwrap();
        for _ in 0..20 {
            assert!((sampler.sample(&mut rng) - 0.02).abs() < 1e-15);
        }
    }

    #[test]
    fn uniform_draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let sampler = parse(r#"{"distribution": "uniform", "low": 0.2, "high": 0.4}"#)
            .build("hypochondria")
            .unwrap();
        for _ in 0..500 {
            let v = sampler.sample(&mut rng);
            assert!((0.2..0.4).contains(&v));
        }
    }

    #[test]
    fn unknown_distribution_is_reported_by_name() {
        let err = parse(r#"{"distribution": "zipf", "n": 3}"#)
            .build("immunity")
            .unwrap_err();
        match err {
            ConfigError::UnknownDistribution { param, name } => {
                assert_eq!(param, "immunity");
                assert_eq!(name, "zipf");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn known_distribution_with_bad_fields_is_not_called_unknown() {
        let err = parse(r#"{"distribution": "normal", "mean": 1.0}"#)
            .build("severity")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDistribution { .. }));
    }

    #[test]
    fn invalid_parameters_fail_at_build_time() {
        assert!(Sampler::gaussian(1.0, -0.5).build("severity").is_err());
        assert!(parse(r#"{"distribution": "uniform", "low": 1, "high": 1}"#)
            .build("speed")
            .is_err());
        assert!(parse(r#"{"distribution": "gamma", "shape": -1, "scale": 1}"#)
            .build("speed")
            .is_err());
        assert!(matches!(
            Sampler::Choice(vec![]).build("speed"),
            Err(ConfigError::EmptyChoices("speed"))
        ));
    }

    #[test]
    fn degenerate_scales_are_configuration_errors() {
        let rejected = [
            r#"{"mean": 0.02, "sigma": -0.01}"#,
            r#"{"distribution": "normal", "mean": 0.02, "sigma": -1}"#,
            r#"{"distribution": "lognormal", "mu": 0, "sigma": -0.5}"#,
            r#"{"distribution": "exponential", "lambda": 0}"#,
            r#"{"distribution": "exponential", "lambda": -2}"#,
            r#"{"distribution": "gamma", "shape": 2, "scale": 0}"#,
            r#"{"distribution": "beta", "alpha": 0, "beta": 1}"#,
            r#"{"distribution": "triangular", "min": 0, "max": 1, "mode": 2}"#,
        ];
        for json in rejected {
            assert!(
                matches!(
                    parse(json).build("speed"),
                    Err(ConfigError::InvalidDistribution { param: "speed", .. })
                ),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn positive_rate_exponential_draws_finite_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sampler = parse(r#"{"distribution": "exponential", "lambda": 50}"#)
            .build("speed")
            .unwrap();
        for _ in 0..200 {
            let v = sampler.sample(&mut rng);
            assert!(v.is_finite() && v >= 0.0);
        }
    }
}
