//! How well a theoretical distribution stands in for a sample.
//!
//! The normal approximation to reported heights works well over wide
//! intervals and fails over narrow ones, because people report rounded
//! values. Over `(69.5, 70.5]` the sample holds everyone who answered
//! "70" and the normal curve agrees. Over `(70.1, 70.9]` the sample is
//! nearly empty while the curve still assigns real mass. The comparisons
//! here put numbers on that.

use crate::distributions::ContinuousDistribution;
use crate::ecdf::Ecdf;
use crate::error::{check_finite, ProbError, Result};
use crate::histogram::FrequencyTable;

/// Empirical vs theoretical probability of one interval `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalComparison {
    pub lower: f64,
    pub upper: f64,
    /// Share of the sample inside the interval.
    pub empirical: f64,
    /// Probability the distribution assigns to it.
    pub theoretical: f64,
}

impl IntervalComparison {
    /// `empirical / theoretical`; `None` when the model assigns no mass.
    pub fn ratio(&self) -> Option<f64> {
        if self.theoretical > 0.0 {
            Some(self.empirical / self.theoretical)
        } else {
            None
        }
    }

    pub fn abs_error(&self) -> f64 {
        (self.empirical - self.theoretical).abs()
    }
}

impl std::fmt::Display for IntervalComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}]: empirical={:.4} theoretical={:.4}",
            self.lower, self.upper, self.empirical, self.theoretical
        )?;
        match self.ratio() {
            Some(r) => write!(f, " ratio={r:.3}"),
            None => write!(f, " ratio=n/a"),
        }
    }
}

/// Compares `F̂(b) − F̂(a)` with `F(b) − F(a)`.
///
/// # Examples
/// ```
/// use u_probability::approximation::compare_interval;
/// use u_probability::distributions::Normal;
/// use u_probability::ecdf::Ecdf;
/// let ecdf = Ecdf::new(&[68.0, 69.0, 70.0, 70.0, 71.0, 72.0]).unwrap();
/// let model = Normal::new(70.0, 1.4).unwrap();
/// let c = compare_interval(&ecdf, &model, 69.5, 70.5);
/// assert!((c.empirical - 1.0 / 3.0).abs() < 1e-15);
/// assert!(c.theoretical > 0.2 && c.theoretical < 0.3);
/// ```
pub fn compare_interval<D: ContinuousDistribution>(
    ecdf: &Ecdf,
    dist: &D,
    lower: f64,
    upper: f64,
) -> IntervalComparison {
    IntervalComparison {
        lower,
        upper,
        empirical: ecdf.prob_between(lower, upper),
        theoretical: dist.prob_between(lower, upper),
    }
}

pub fn compare_intervals<D: ContinuousDistribution>(
    ecdf: &Ecdf,
    dist: &D,
    intervals: &[(f64, f64)],
) -> Vec<IntervalComparison> {
    intervals
        .iter()
        .map(|&(a, b)| compare_interval(ecdf, dist, a, b))
        .collect()
}

/// Compares the interval `(center − half_width, center + half_width]`.
pub fn compare_around<D: ContinuousDistribution>(
    ecdf: &Ecdf,
    dist: &D,
    center: f64,
    half_width: f64,
) -> IntervalComparison {
    compare_interval(ecdf, dist, center - half_width, center + half_width)
}

/// Consecutive intervals of `width` tiling `[start, end]`.
///
/// Sweeping unit-wide cells offset by one half (67.5, 68.5, ...) against
/// cells aligned on integers (68, 69, ...) is the quickest way to see
/// the effect of rounding.
///
/// # Errors
/// Returns `Err` unless `width > 0` and `start < end`, all finite.
pub fn compare_grid<D: ContinuousDistribution>(
    ecdf: &Ecdf,
    dist: &D,
    start: f64,
    end: f64,
    width: f64,
) -> Result<Vec<IntervalComparison>> {
    if !(start.is_finite() && end.is_finite() && width.is_finite()) || width <= 0.0 || start >= end
    {
        return Err(ProbError::InvalidParameters(format!(
            "grid needs start < end and width > 0, got start={start}, end={end}, width={width}"
        )));
    }
    // Left edges within a rounding error of `end` would only add a sliver.
    let last_start = end - width * 1e-9;
    let cells = ((end - start) / width).ceil() as usize;
    Ok((0..cells)
        .map(|i| start + i as f64 * width)
        .take_while(|&a| a < last_start)
        .map(|a| compare_interval(ecdf, dist, a, (a + width).min(end)))
        .collect())
}

/// Finite-difference density from the ECDF:
/// `(F̂(x + w/2) − F̂(x − w/2)) / w`.
///
/// The density is the slope of the CDF, and this is the sample's version
/// of that slope over a window of width `w`.
///
/// # Returns
/// - `None` unless `width` is finite and positive.
pub fn density_estimate(ecdf: &Ecdf, x: f64, width: f64) -> Option<f64> {
    if !width.is_finite() || width <= 0.0 {
        return None;
    }
    let half = width / 2.0;
    Some(ecdf.prob_between(x - half, x + half) / width)
}

/// Summary of how strongly a sample clusters on whole numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizationReport {
    pub n: usize,
    pub distinct: usize,
    /// Share of points within `tolerance` of an integer.
    pub integer_share: f64,
    /// Most frequent values, most frequent first.
    pub top_values: Vec<(f64, usize)>,
    pub tolerance: f64,
}

impl DiscretizationReport {
    const TOP: usize = 5;

    /// # Errors
    /// - [`ProbError::EmptySample`] for an empty sample.
    /// - [`ProbError::NonFiniteValue`] for NaN/Inf points.
    /// - [`ProbError::InvalidParameters`] for a negative or NaN tolerance.
    ///
    /// # Examples
    /// ```
    /// use u_probability::approximation::DiscretizationReport;
    /// let r = DiscretizationReport::analyze(&[68.0, 70.0, 70.0, 69.29], 1e-9).unwrap();
    /// assert_eq!(r.integer_share, 0.75);
    /// assert_eq!(r.top_values[0], (70.0, 2));
    /// assert!(r.is_discretized(0.5));
    /// ```
    pub fn analyze(data: &[f64], tolerance: f64) -> Result<Self> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(ProbError::InvalidParameters(format!(
                "tolerance must be >= 0, got {tolerance}"
            )));
        }
        if data.is_empty() {
            return Err(ProbError::EmptySample);
        }
        check_finite(data)?;
        let table = FrequencyTable::from_data(data)?;
        let on_integer = data
            .iter()
            .filter(|&&x| (x - x.round()).abs() <= tolerance)
            .count();
        Ok(Self {
            n: data.len(),
            distinct: table.distinct(),
            integer_share: on_integer as f64 / data.len() as f64,
            top_values: table.most_common(Self::TOP),
            tolerance,
        })
    }

    /// Whether at least `threshold` of the sample sits on integers.
    pub fn is_discretized(&self, threshold: f64) -> bool {
        self.integer_share >= threshold
    }
}
