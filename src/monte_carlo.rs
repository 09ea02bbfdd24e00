//! Monte Carlo estimation by repeated independent trials.
//!
//! A [`MonteCarlo`] runner owns a trial count and a seed. Each estimator
//! builds one seeded RNG stream and runs a closure once per trial, so
//! the same seed always reproduces the same estimate.
//!
//! The typical question answered here: in a group of 800 people drawn
//! from N(69, 3), how often is the tallest at least seven feet? Run the
//! experiment many times and count.
//!
//! ```
//! use u_probability::distributions::Normal;
//! use u_probability::monte_carlo::MonteCarlo;
//! let heights = Normal::new(69.0, 3.0).unwrap();
//! let mc = MonteCarlo::new(2_000).unwrap().with_seed(7);
//! let est = mc.prob_max_at_least(&heights, 800, 84.0).unwrap();
//! assert!(est.p < 0.05);
//! ```

use rand::rngs::SmallRng;
use tracing::debug;

use crate::distributions::ContinuousDistribution;
use crate::error::{ProbError, Result};
use crate::random::create_rng;
use crate::special;
use crate::stats::WelfordAccumulator;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 1;

/// Repeated-trial runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarlo {
    trials: usize,
    seed: u64,
}

impl MonteCarlo {
    /// # Errors
    /// Returns `Err` if `trials` is zero.
    pub fn new(trials: usize) -> Result<Self> {
        if trials == 0 {
            return Err(ProbError::InvalidParameters(
                "Monte Carlo needs at least one trial".into(),
            ));
        }
        Ok(Self {
            trials,
            seed: DEFAULT_SEED,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs `trial` once per trial and collects every outcome.
    ///
    /// # Examples
    /// ```
    /// use rand::Rng;
    /// use u_probability::monte_carlo::MonteCarlo;
    /// let mc = MonteCarlo::new(5).unwrap();
    /// let rolls = mc.replicate(|rng| rng.random_range(1..=6));
    /// assert_eq!(rolls.len(), 5);
    /// ```
    pub fn replicate<T, F>(&self, mut trial: F) -> Vec<T>
    where
        F: FnMut(&mut SmallRng) -> T,
    {
        debug!(trials = self.trials, seed = self.seed, "replicating trials");
        let mut rng = create_rng(self.seed);
        let outcomes: Vec<T> = (0..self.trials).map(|_| trial(&mut rng)).collect();
        debug!(trials = outcomes.len(), "replication finished");
        outcomes
    }

    /// Estimates `P(event)` as the fraction of trials where it occurs.
    pub fn estimate_probability<F>(&self, mut event: F) -> ProbabilityEstimate
    where
        F: FnMut(&mut SmallRng) -> bool,
    {
        let mut rng = create_rng(self.seed);
        let successes = (0..self.trials).filter(|_| event(&mut rng)).count();
        let estimate = ProbabilityEstimate::from_counts(successes, self.trials);
        debug!(
            trials = self.trials,
            successes,
            p = estimate.p,
            std_error = estimate.std_error,
            "probability estimate"
        );
        estimate
    }

    /// Estimates `E[statistic]` by averaging over trials.
    pub fn estimate_mean<F>(&self, mut statistic: F) -> MeanEstimate
    where
        F: FnMut(&mut SmallRng) -> f64,
    {
        let mut rng = create_rng(self.seed);
        let mut acc = WelfordAccumulator::new();
        for _ in 0..self.trials {
            acc.update(statistic(&mut rng));
        }
        let mean = acc.mean().unwrap_or(f64::NAN);
        let sd = acc.sample_std_dev().unwrap_or(0.0);
        let estimate = MeanEstimate {
            mean,
            sd,
            std_error: sd / (self.trials as f64).sqrt(),
            trials: self.trials,
        };
        debug!(trials = self.trials, mean, sd, "mean estimate");
        estimate
    }

    /// The maximum of `sample_size` draws from `dist`, once per trial.
    ///
    /// # Errors
    /// Returns `Err` if `sample_size` is zero.
    pub fn simulate_maxima<D>(&self, dist: &D, sample_size: usize) -> Result<Vec<f64>>
    where
        D: ContinuousDistribution,
    {
        if sample_size == 0 {
            return Err(ProbError::EmptySample);
        }
        Ok(self.replicate(|rng| {
            (0..sample_size)
                .map(|_| dist.sample(rng))
                .fold(f64::NEG_INFINITY, f64::max)
        }))
    }

    /// Estimates the probability that the largest of `sample_size` draws
    /// from `dist` is at least `threshold`.
    ///
    /// # Errors
    /// Returns `Err` if `sample_size` is zero.
    pub fn prob_max_at_least<D>(
        &self,
        dist: &D,
        sample_size: usize,
        threshold: f64,
    ) -> Result<ProbabilityEstimate>
    where
        D: ContinuousDistribution,
    {
        let maxima = self.simulate_maxima(dist, sample_size)?;
        let successes = maxima.iter().filter(|&&m| m >= threshold).count();
        let estimate = ProbabilityEstimate::from_counts(successes, self.trials);
        debug!(
            sample_size,
            threshold,
            successes,
            p = estimate.p,
            "maximum simulation finished"
        );
        Ok(estimate)
    }
}

/// Frequency of an event over independent trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityEstimate {
    pub successes: usize,
    pub trials: usize,
    /// p̂ = successes / trials
    pub p: f64,
    /// √(p̂(1 − p̂)/B)
    pub std_error: f64,
}

impl ProbabilityEstimate {
    /// Zero `trials` yields `p = NaN`.
    pub fn from_counts(successes: usize, trials: usize) -> Self {
        let b = trials as f64;
        let p = successes as f64 / b;
        Self {
            successes,
            trials,
            p,
            std_error: (p * (1.0 - p) / b).sqrt(),
        }
    }

    /// Normal-approximation (Wald) interval at `level`, clipped to [0, 1].
    ///
    /// # Returns
    /// - `None` if `level` is outside `(0, 1)`.
    pub fn confidence_interval(&self, level: f64) -> Option<(f64, f64)> {
        let z = critical_value(level)?;
        let half = z * self.std_error;
        Some(((self.p - half).max(0.0), (self.p + half).min(1.0)))
    }
}

impl std::fmt::Display for ProbabilityEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "p={:.6} (se {:.6}, {}/{} trials)",
            self.p, self.std_error, self.successes, self.trials
        )
    }
}

/// Average of a statistic over independent trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanEstimate {
    pub mean: f64,
    /// Spread of the statistic across trials.
    pub sd: f64,
    /// sd / √B
    pub std_error: f64,
    pub trials: usize,
}

impl MeanEstimate {
    /// `mean ± z·std_error` at `level`.
    pub fn confidence_interval(&self, level: f64) -> Option<(f64, f64)> {
        let z = critical_value(level)?;
        let half = z * self.std_error;
        Some((self.mean - half, self.mean + half))
    }
}

fn critical_value(level: f64) -> Option<f64> {
    if !(level > 0.0 && level < 1.0) {
        return None;
    }
    Some(special::inverse_normal_cdf(0.5 + level / 2.0))
}
