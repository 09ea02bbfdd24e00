//! Continuous probability distributions.
//!
//! Every distribution exposes the same four operations through
//! [`ContinuousDistribution`]: density, cumulative probability, quantile and
//! random draws (R's `d`, `p`, `q` and `r` prefixes).
//!
//! | Type | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`Normal`] | μ, σ > 0 | μ | σ² |
//! | [`Uniform`] | lower < upper | midpoint | width²/12 |
//! | [`Exponential`] | rate λ > 0 | 1/λ | 1/λ² |
//! | [`StudentT`] | ν > 0 | 0 if ν > 1 | ν/(ν−2) if ν > 2 |

use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};

use crate::error::{check_finite, ProbError, Result};
use crate::special;
use crate::stats;

/// Density, CDF, quantile and sampling for a univariate continuous law.
pub trait ContinuousDistribution {
    /// Probability density `f(x)`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative probability `F(x) = P(X ≤ x)`.
    fn cdf(&self, x: f64) -> f64;

    /// Inverse CDF. `None` when `p` is outside the support of the inverse.
    fn quantile(&self, p: f64) -> Option<f64>;

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Draws one value.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;

    /// Draws `n` independent values.
    fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// `P(a < X ≤ b) = F(b) − F(a)`. Zero when `b ≤ a`.
    fn prob_between(&self, a: f64, b: f64) -> f64 {
        if b <= a {
            return 0.0;
        }
        (self.cdf(b) - self.cdf(a)).max(0.0)
    }

    /// `P(X > a) = 1 − F(a)`.
    fn prob_above(&self, a: f64) -> f64 {
        1.0 - self.cdf(a)
    }
}

// ============================================================================
// Normal
// ============================================================================

/// The normal law with mean μ and standard deviation σ.
///
/// Every probability is computed on the standardized scale: `F(x) =
/// Φ((x − μ)/σ)` and `f(x) = φ((x − μ)/σ)/σ`.
///
/// # Examples
/// ```
/// use u_probability::distributions::{ContinuousDistribution, Normal};
/// let heights = Normal::new(69.3, 3.6).unwrap();
/// assert!((heights.cdf(69.3) - 0.5).abs() < 1e-15);
/// assert!(heights.prob_above(84.0) < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// # Errors
    /// [`ProbError::InvalidParameters`] unless `mu` is finite and `sigma`
    /// is finite and positive.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if mu.is_finite() && sigma.is_finite() && sigma > 0.0 {
            Ok(Self { mu, sigma })
        } else {
            Err(ProbError::InvalidParameters(format!(
                "normal needs a finite mean and a positive sd, got mean={mu}, sd={sigma}"
            )))
        }
    }

    /// N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }

    /// Fits N(x̄, s) to a sample, with `s` the n − 1 standard deviation.
    ///
    /// # Errors
    /// - [`ProbError::EmptySample`] for fewer than two points.
    /// - [`ProbError::NonFiniteValue`] for NaN/Inf points.
    /// - [`ProbError::InvalidParameters`] if every point is identical.
    ///
    /// # Examples
    /// ```
    /// use u_probability::distributions::Normal;
    /// let fit = Normal::fit(&[63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0]).unwrap();
    /// assert_eq!(fit.mu(), 68.5);
    /// assert!((fit.sigma() - 3.8913824205360674).abs() < 1e-12);
    /// ```
    pub fn fit(data: &[f64]) -> Result<Self> {
        if data.len() < 2 {
            return Err(ProbError::EmptySample);
        }
        check_finite(data)?;
        let mu = stats::mean(data).ok_or(ProbError::EmptySample)?;
        let sigma = stats::std_dev(data).ok_or(ProbError::EmptySample)?;
        Self::new(mu, sigma)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Standard units: `(x − μ) / σ`.
    pub fn z_score(&self, x: f64) -> f64 {
        (x - self.mu) / self.sigma
    }

    /// Converts every point to standard units.
    pub fn standardize(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&x| self.z_score(x)).collect()
    }
}

impl ContinuousDistribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        special::standard_normal_pdf(self.z_score(x)) / self.sigma
    }

    fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf(self.z_score(x))
    }

    /// `μ + σ·Φ⁻¹(p)` for `p ∈ (0, 1)`.
    fn quantile(&self, p: f64) -> Option<f64> {
        if !(p > 0.0 && p < 1.0) {
            return None;
        }
        Some(self.mu + self.sigma * special::inverse_normal_cdf(p))
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    fn std_dev(&self) -> f64 {
        self.sigma
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        self.mu + self.sigma * z
    }

    /// Computed from the upper tail directly so that tiny probabilities
    /// survive instead of cancelling against 1.
    fn prob_above(&self, a: f64) -> f64 {
        special::standard_normal_cdf(-self.z_score(a))
    }
}

// ============================================================================
// Uniform
// ============================================================================

/// Flat density on `[lower, upper]`.
///
/// Useful as the "no rounding" model for the fractional part of a
/// reported measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    lower: f64,
    upper: f64,
}

impl Uniform {
    /// # Errors
    /// [`ProbError::InvalidParameters`] unless both bounds are finite and
    /// `lower < upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_finite() && upper.is_finite() && lower < upper {
            Ok(Self { lower, upper })
        } else {
            Err(ProbError::InvalidParameters(format!(
                "uniform needs finite bounds with lower < upper, got [{lower}, {upper}]"
            )))
        }
    }

    pub fn min(&self) -> f64 {
        self.lower
    }

    pub fn max(&self) -> f64 {
        self.upper
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl ContinuousDistribution for Uniform {
    fn pdf(&self, x: f64) -> f64 {
        if (self.lower..=self.upper).contains(&x) {
            self.width().recip()
        } else {
            0.0
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        ((x - self.lower) / self.width()).clamp(0.0, 1.0)
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        (0.0..=1.0)
            .contains(&p)
            .then(|| self.lower + p * self.width())
    }

    fn mean(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    fn variance(&self) -> f64 {
        self.width().powi(2) / 12.0
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.lower..self.upper)
    }
}

// ============================================================================
// Exponential
// ============================================================================

/// Exponential distribution with rate λ.
///
/// - PDF: λ exp(−λx) for x ≥ 0
/// - CDF: 1 − exp(−λx)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    /// # Errors
    /// [`ProbError::InvalidParameters`] unless `rate` is finite and positive.
    pub fn new(rate: f64) -> Result<Self> {
        if rate.is_finite() && rate > 0.0 {
            Ok(Self { rate })
        } else {
            Err(ProbError::InvalidParameters(format!(
                "exponential needs a positive rate, got {rate}"
            )))
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl ContinuousDistribution for Exponential {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            self.rate * (-self.rate * x).exp()
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            -(-self.rate * x).exp_m1()
        }
    }

    /// `−ln(1 − p)/λ` for `p ∈ [0, 1)`.
    fn quantile(&self, p: f64) -> Option<f64> {
        if !(0.0..1.0).contains(&p) {
            return None;
        }
        Some(-(-p).ln_1p() / self.rate)
    }

    fn mean(&self) -> f64 {
        1.0 / self.rate
    }

    fn variance(&self) -> f64 {
        1.0 / (self.rate * self.rate)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let e: f64 = Exp1.sample(rng);
        e / self.rate
    }

    fn prob_above(&self, a: f64) -> f64 {
        if a <= 0.0 {
            1.0
        } else {
            (-self.rate * a).exp()
        }
    }
}

// ============================================================================
// Student's t
// ============================================================================

/// Student's t-distribution with ν degrees of freedom.
///
/// Heavier-tailed than the normal; converges to N(0, 1) as ν → ∞.
#[derive(Debug, Clone)]
pub struct StudentT {
    df: f64,
    sampler: rand_distr::StudentT<f64>,
}

impl StudentT {
    /// # Errors
    /// [`ProbError::InvalidParameters`] unless `df` is finite and positive.
    pub fn new(df: f64) -> Result<Self> {
        if !(df.is_finite() && df > 0.0) {
            return Err(ProbError::InvalidParameters(format!(
                "t needs positive degrees of freedom, got {df}"
            )));
        }
        let sampler = rand_distr::StudentT::new(df)
            .map_err(|e| ProbError::InvalidParameters(format!("t with df={df}: {e}")))?;
        Ok(Self { df, sampler })
    }

    pub fn df(&self) -> f64 {
        self.df
    }
}

impl ContinuousDistribution for StudentT {
    fn pdf(&self, x: f64) -> f64 {
        special::t_distribution_pdf(x, self.df)
    }

    fn cdf(&self, x: f64) -> f64 {
        special::t_distribution_cdf(x, self.df)
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        if !(p > 0.0 && p < 1.0) {
            return None;
        }
        Some(special::t_distribution_quantile(p, self.df))
    }

    /// Zero for ν > 1, undefined (NaN) otherwise.
    fn mean(&self) -> f64 {
        if self.df > 1.0 {
            0.0
        } else {
            f64::NAN
        }
    }

    /// ν/(ν−2) for ν > 2, infinite for 1 < ν ≤ 2, undefined otherwise.
    fn variance(&self) -> f64 {
        if self.df > 2.0 {
            self.df / (self.df - 2.0)
        } else if self.df > 1.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler.sample(rng)
    }
}
