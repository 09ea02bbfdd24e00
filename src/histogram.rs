//! Binning and tabulation.
//!
//! [`Histogram`] groups a sample into contiguous intervals. Bins are
//! right-closed `(a, b]` except the first, which also includes its left
//! edge. [`FrequencyTable`] counts exact distinct values and is what
//! exposes discretization: heights typed in whole inches pile up on
//! integers, which a histogram with wide bins hides.

use tracing::debug;

use crate::error::{check_finite, ProbError, Result};

/// Counts of a sample over contiguous bins.
///
/// # Examples
/// ```
/// use u_probability::histogram::Histogram;
/// let h = Histogram::with_breaks(&[1.0, 2.0, 2.0, 3.5, 4.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(h.counts(), &[3, 0, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    breaks: Vec<f64>,
    counts: Vec<usize>,
    outside: usize,
}

impl Histogram {
    /// `k` equal-width bins spanning `[min, max]` of the data.
    ///
    /// A constant sample gets a unit-wide range centred on its value. A
    /// range too narrow to hold `k` distinct breaks at the sample's
    /// magnitude is widened around its midpoint.
    ///
    /// # Errors
    /// - [`ProbError::EmptySample`] for an empty sample.
    /// - [`ProbError::NonFiniteValue`] for NaN/Inf points.
    /// - [`ProbError::InvalidBins`] if `k` is zero.
    pub fn with_bins(data: &[f64], k: usize) -> Result<Self> {
        if k == 0 {
            return Err(ProbError::InvalidBins("need at least one bin".into()));
        }
        let (lo, hi) = finite_range(data)?;
        let (lo, hi) = bin_range(lo, hi, k);
        let span = hi - lo;
        let mut breaks: Vec<f64> = if span.is_finite() {
            let width = span / k as f64;
            (0..k).map(|i| lo + i as f64 * width).collect()
        } else {
            // Range wider than f64::MAX: interpolate instead.
            (0..k)
                .map(|i| {
                    let t = i as f64 / k as f64;
                    lo * (1.0 - t) + hi * t
                })
                .collect()
        };
        breaks.push(hi);
        Self::with_breaks(data, &breaks)
    }

    /// Bin count from Sturges' rule, `⌈log₂ n⌉ + 1`.
    pub fn sturges(data: &[f64]) -> Result<Self> {
        Self::with_bins(data, sturges_bins(data.len()))
    }

    /// Bins delimited by explicit `breaks`.
    ///
    /// Points outside `[breaks[0], breaks[last]]` are tallied in
    /// [`outside`](Self::outside) rather than dropped silently.
    ///
    /// # Errors
    /// - [`ProbError::InvalidBins`] if fewer than two breaks are given, or
    ///   they are not finite and strictly increasing.
    /// - [`ProbError::NonFiniteValue`] for NaN/Inf points.
    pub fn with_breaks(data: &[f64], breaks: &[f64]) -> Result<Self> {
        if breaks.len() < 2 {
            return Err(ProbError::InvalidBins(format!(
                "need at least two breaks, got {}",
                breaks.len()
            )));
        }
        if !breaks.iter().all(|b| b.is_finite()) || !breaks.windows(2).all(|w| w[0] < w[1]) {
            return Err(ProbError::InvalidBins(
                "breaks must be finite and strictly increasing".into(),
            ));
        }
        check_finite(data)?;

        let first = breaks[0];
        let last = breaks[breaks.len() - 1];
        let mut counts = vec![0; breaks.len() - 1];
        let mut outside = 0;
        for &x in data {
            if x < first || x > last {
                outside += 1;
                continue;
            }
            let i = breaks.partition_point(|&b| b < x);
            counts[i.saturating_sub(1)] += 1;
        }
        debug!(bins = counts.len(), n = data.len(), outside, "built histogram");
        Ok(Self {
            breaks: breaks.to_vec(),
            counts,
            outside,
        })
    }

    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Points that fell outside the outermost breaks.
    pub fn outside(&self) -> usize {
        self.outside
    }

    /// Number of points inside the bins.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin midpoints.
    pub fn mids(&self) -> Vec<f64> {
        self.breaks.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.breaks.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Share of the in-range points in each bin; sums to 1.
    pub fn relative_frequencies(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    /// Density scale: `count / (total · width)`, so the bar areas sum to 1
    /// and the histogram is comparable with a probability density.
    pub fn densities(&self) -> Vec<f64> {
        let total = self.total() as f64;
        if total == 0.0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .zip(self.widths())
            .map(|(&c, w)| c as f64 / (total * w))
            .collect()
    }
}

/// `⌈log₂ n⌉ + 1`, the default bin count in R's `hist`.
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Widens `[lo, hi]` so that `k` equal steps stay distinct in `f64`.
fn bin_range(lo: f64, hi: f64, k: usize) -> (f64, f64) {
    let magnitude = lo.abs().max(hi.abs());
    let floor = if lo == hi { 1.0 } else { 0.0 };
    let min_span = (16.0 * f64::EPSILON * magnitude * k as f64).max(floor);
    if hi - lo >= min_span {
        return (lo, hi);
    }
    let mid = 0.5 * lo + 0.5 * hi;
    let half = 0.5 * min_span;
    (lo.min(mid - half), hi.max(mid + half))
}

fn finite_range(data: &[f64]) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(ProbError::EmptySample);
    }
    check_finite(data)?;
    let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// Counts of each exact distinct value, ascending by value.
///
/// # Examples
/// ```
/// use u_probability::histogram::FrequencyTable;
/// let t = FrequencyTable::from_data(&[70.0, 68.0, 70.0, 69.5]).unwrap();
/// assert_eq!(t.entries(), &[(68.0, 1), (69.5, 1), (70.0, 2)]);
/// assert_eq!(t.proportion(70.0), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<(f64, usize)>,
    n: usize,
}

impl FrequencyTable {
    /// # Errors
    /// - [`ProbError::EmptySample`] for an empty sample.
    /// - [`ProbError::NonFiniteValue`] for NaN/Inf points.
    pub fn from_data(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(ProbError::EmptySample);
        }
        check_finite(data)?;
        let mut sorted = data.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let mut entries: Vec<(f64, usize)> = Vec::new();
        for x in sorted {
            match entries.last_mut() {
                Some((v, c)) if *v == x => *c += 1,
                _ => entries.push((x, 1)),
            }
        }
        Ok(Self {
            entries,
            n: data.len(),
        })
    }

    pub fn entries(&self) -> &[(f64, usize)] {
        &self.entries
    }

    /// Sample size.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn count(&self, value: f64) -> usize {
        self.entries
            .binary_search_by(|(v, _)| v.total_cmp(&value))
            .map(|i| self.entries[i].1)
            .unwrap_or(0)
    }

    /// Share of the sample equal to `value`.
    pub fn proportion(&self, value: f64) -> f64 {
        self.count(value) as f64 / self.n as f64
    }

    /// The `k` most frequent values, most frequent first; ties go to the
    /// smaller value.
    pub fn most_common(&self, k: usize) -> Vec<(f64, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}
