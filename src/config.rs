//! TOML experiment configuration.
//!
//! ```toml
//! [simulation]
//! seed = 1
//! trials = 10000
//! sample_size = 800
//! threshold = 84.0
//!
//! [normal]
//! mean = 69.3
//! sd = 3.6
//!
//! [histogram]
//! bins = 12
//! ```
//!
//! Every section and field is optional.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::dataset::feet_to_inches;
use crate::distributions::Normal;
use crate::error::{ProbError, Result};
use crate::monte_carlo::DEFAULT_SEED;
use crate::stats;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub simulation: SimulationConfig,
    pub normal: NormalConfig,
    pub histogram: HistogramConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub trials: usize,
    /// Draws per trial.
    pub sample_size: usize,
    /// Height (inches) the sample maximum is compared against.
    pub threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            trials: 10_000,
            sample_size: 800,
            threshold: feet_to_inches(7.0),
        }
    }
}

/// Normal parameters. Missing values are fitted from data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NormalConfig {
    pub mean: Option<f64>,
    pub sd: Option<f64>,
}

/// `bins = None` selects Sturges' rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub bins: Option<usize>,
}

/// Values given on the command line. Each `Some` replaces the configured
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    pub sample_size: Option<usize>,
    pub threshold: Option<f64>,
    pub bins: Option<usize>,
}

impl ExperimentConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.trials == 0 {
            return Err(invalid("simulation.trials", "must be at least 1"));
        }
        if sim.sample_size == 0 {
            return Err(invalid("simulation.sample_size", "must be at least 1"));
        }
        if !sim.threshold.is_finite() {
            return Err(invalid("simulation.threshold", "must be finite"));
        }
        if let Some(mean) = self.normal.mean {
            if !mean.is_finite() {
                return Err(invalid("normal.mean", "must be finite"));
            }
        }
        if let Some(sd) = self.normal.sd {
            if !(sd.is_finite() && sd > 0.0) {
                return Err(invalid("normal.sd", "must be positive and finite"));
            }
        }
        if self.histogram.bins == Some(0) {
            return Err(invalid("histogram.bins", "must be at least 1"));
        }
        Ok(())
    }
}

impl ExperimentConfig {
    /// Applies `overrides` on top of the loaded values, then validates the
    /// merged result.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self> {
        fn replace<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        let sim = &mut self.simulation;
        replace(&mut sim.seed, overrides.seed);
        replace(&mut sim.trials, overrides.trials);
        replace(&mut sim.sample_size, overrides.sample_size);
        replace(&mut sim.threshold, overrides.threshold);
        self.normal.mean = overrides.mean.or(self.normal.mean);
        self.normal.sd = overrides.sd.or(self.normal.sd);
        self.histogram.bins = overrides.bins.or(self.histogram.bins);
        self.validate()?;
        Ok(self)
    }

    /// The normal model: configured parameters first, sample estimates
    /// (mean and n − 1 SD of `data`) for whatever is missing.
    ///
    /// # Errors
    /// [`ProbError::Config`] when a parameter is neither configured nor
    /// estimable, and [`ProbError::InvalidParameters`] when the estimate is
    /// degenerate (a constant sample).
    pub fn resolve_normal(&self, data: Option<&[f64]>) -> Result<Normal> {
        let estimate = |f: fn(&[f64]) -> Option<f64>| data.and_then(f);
        let mean = self.normal.mean.or_else(|| estimate(stats::mean));
        let sd = self.normal.sd.or_else(|| estimate(stats::std_dev));
        match (mean, sd) {
            (Some(mean), Some(sd)) => {
                debug!(mean, sd, "normal model");
                Normal::new(mean, sd)
            }
            (None, _) => Err(invalid("normal.mean", "is not set and no sample was given")),
            (_, None) => Err(invalid("normal.sd", "is not set and no sample was given")),
        }
    }
}

fn invalid(field: &str, reason: &str) -> ProbError {
    ProbError::Config(format!("{field} {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ExperimentConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert_eq!(config.simulation.seed, DEFAULT_SEED);
        assert_eq!(config.simulation.threshold, 84.0);
        assert_eq!(config.normal.sd, None);
        assert_eq!(config.histogram.bins, None);
    }

    #[test]
    fn test_partial_sections() {
        let config = ExperimentConfig::from_toml_str(
            r#"
[simulation]
trials = 500

[normal]
sd = 3.6
"#,
        )
        .unwrap();
        assert_eq!(config.simulation.trials, 500);
        assert_eq!(config.simulation.sample_size, 800);
        assert_eq!(config.normal.mean, None);
        assert_eq!(config.normal.sd, Some(3.6));
    }

    #[test]
    fn test_validation_errors() {
        for doc in [
            "[simulation]\ntrials = 0",
            "[simulation]\nsample_size = 0",
            "[normal]\nsd = 0.0",
            "[normal]\nsd = -1.0",
            "[histogram]\nbins = 0",
        ] {
            let err = ExperimentConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, ProbError::Config(_)), "{doc}");
        }
    }

    #[test]
    fn test_malformed_toml() {
        let err = ExperimentConfig::from_toml_str("[simulation\ntrials = 1").unwrap_err();
        assert!(matches!(err, ProbError::Toml(_)));
        let err = ExperimentConfig::from_toml_str("[simulation]\ntrials = \"many\"").unwrap_err();
        assert!(matches!(err, ProbError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[histogram]\nbins = 7\n").unwrap();
        let config = ExperimentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.histogram.bins, Some(7));
    }

    #[test]
    fn test_missing_file() {
        let err = ExperimentConfig::from_file("/nonexistent/experiment.toml").unwrap_err();
        assert!(matches!(err, ProbError::Io(_)));
    }

    fn male_sample() -> Vec<f64> {
        vec![63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0]
    }

    #[test]
    fn test_flags_beat_config() {
        let config = ExperimentConfig::from_toml_str(
            "[simulation]\ntrials = 500\nseed = 3\n[normal]\nmean = 69.0\nsd = 3.0\n",
        )
        .unwrap();
        let merged = config
            .with_overrides(&Overrides {
                mean: Some(64.0),
                trials: Some(2_000),
                bins: Some(9),
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(merged.normal.mean, Some(64.0));
        assert_eq!(merged.normal.sd, Some(3.0));
        assert_eq!(merged.simulation.trials, 2_000);
        assert_eq!(merged.simulation.seed, 3);
        assert_eq!(merged.histogram.bins, Some(9));
    }

    #[test]
    fn test_overrides_are_validated() {
        let bad = ExperimentConfig::default().with_overrides(&Overrides {
            sd: Some(-1.0),
            ..Overrides::default()
        });
        assert!(matches!(bad, Err(ProbError::Config(msg)) if msg.contains("normal.sd")));
        let bad = ExperimentConfig::default().with_overrides(&Overrides {
            trials: Some(0),
            ..Overrides::default()
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_config_beats_fit() {
        let config = ExperimentConfig::default()
            .with_overrides(&Overrides {
                sd: Some(3.0),
                ..Overrides::default()
            })
            .unwrap();
        let model = config.resolve_normal(Some(&male_sample())).unwrap();
        assert_eq!(model.mu(), 68.5);
        assert_eq!(model.sigma(), 3.0);
    }

    #[test]
    fn test_fit_fills_missing_parameters() {
        let model = ExperimentConfig::default()
            .resolve_normal(Some(&male_sample()))
            .unwrap();
        assert_eq!(model.mu(), 68.5);
        assert!((model.sigma() - 3.8913824205360674).abs() < 1e-12);
    }

    #[test]
    fn test_missing_normal_parameters() {
        let config = ExperimentConfig::default();
        assert!(matches!(
            config.resolve_normal(None),
            Err(ProbError::Config(msg)) if msg.contains("normal.mean")
        ));
        let half = config
            .with_overrides(&Overrides {
                mean: Some(69.0),
                ..Overrides::default()
            })
            .unwrap();
        assert!(matches!(
            half.resolve_normal(None),
            Err(ProbError::Config(msg)) if msg.contains("normal.sd")
        ));
        assert!(matches!(
            half.resolve_normal(Some(&[70.0, 70.0])),
            Err(ProbError::InvalidParameters(_))
        ));
    }
}
