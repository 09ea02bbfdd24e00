//! Descriptive statistics over a finite sample.
//!
//! These are the numbers read off a sample before any model is fitted:
//! location, spread, extremes, order statistics and the share of points
//! on either side of a threshold.
//!
//! Conventions:
//!
//! - Functions return `None` rather than a meaningless number when the
//!   input is empty or carries NaN/Inf.
//! - Sums are compensated (Neumaier) and variances come from a single
//!   streaming pass (Welford), so a large common offset does not swamp
//!   the spread.
//! - [`quantile`] interpolates between order statistics (Hyndman & Fan
//!   type 7). The step-function inverse lives on [`Ecdf`](crate::ecdf::Ecdf).

use std::fmt;

/// Arithmetic mean.
///
/// # Examples
/// ```
/// use u_probability::stats::mean;
/// let heights = [63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0];
/// assert_eq!(mean(&heights), Some(68.5));
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample variance with the `n − 1` denominator.
///
/// `None` for fewer than two points or any non-finite point.
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    streamed(data)?.sample_variance()
}

/// Variance with the `n` denominator. A single point has variance zero.
pub fn population_variance(data: &[f64]) -> Option<f64> {
    streamed(data)?.population_variance()
}

/// Sample standard deviation.
///
/// This is the SD a fitted normal uses.
///
/// # Examples
/// ```
/// use u_probability::stats::std_dev;
/// let heights = [63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0];
/// let sd = std_dev(&heights).unwrap();
/// assert!((sd - 3.8913824205360674).abs() < 1e-12);
/// ```
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    population_variance(data).map(f64::sqrt)
}

fn streamed(data: &[f64]) -> Option<WelfordAccumulator> {
    if data.is_empty() || data.iter().any(|x| !x.is_finite()) {
        return None;
    }
    let mut acc = WelfordAccumulator::new();
    data.iter().for_each(|&x| acc.update(x));
    Some(acc)
}

/// Smallest point; `None` if empty or any point is NaN.
pub fn min(data: &[f64]) -> Option<f64> {
    extreme(data, f64::INFINITY, f64::min)
}

/// Largest point; `None` if empty or any point is NaN.
///
/// # Examples
/// ```
/// use u_probability::stats::max;
/// assert_eq!(max(&[70.0, 84.0, 66.5]), Some(84.0));
/// assert_eq!(max(&[]), None);
/// ```
pub fn max(data: &[f64]) -> Option<f64> {
    extreme(data, f64::NEG_INFINITY, f64::max)
}

fn extreme(data: &[f64], init: f64, pick: fn(f64, f64) -> f64) -> Option<f64> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    Some(data.iter().copied().fold(init, pick))
}

/// Middle order statistic, averaging the two central points for even `n`.
///
/// # Examples
/// ```
/// use u_probability::stats::median;
/// assert_eq!(median(&[72.0, 64.0, 68.0]), Some(68.0));
/// assert_eq!(median(&[72.0, 64.0, 68.0, 70.0]), Some(69.0));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    quantile(data, 0.5)
}

/// Sample quantile at `p ∈ [0, 1]` by linear interpolation between order
/// statistics: with `h = (n − 1)p`, the result is
/// `x₍⌊h⌋₎ + (h − ⌊h⌋)(x₍⌊h⌋+1₎ − x₍⌊h⌋₎)`.
///
/// Copies and sorts the input. Use [`quantile_sorted`] to reuse an
/// ordering.
///
/// # Returns
/// - `None` if `data` is empty, holds NaN, or `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_probability::stats::quantile;
/// let heights = [75.0, 63.0, 70.0, 66.0, 68.0, 72.0, 65.0, 69.0];
/// assert_eq!(quantile(&heights, 0.25), Some(65.75));
/// assert_eq!(quantile(&heights, 1.0), Some(75.0));
/// ```
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    if data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    quantile_sorted(&sorted, p)
}

/// [`quantile`] on data already sorted ascending. Unsorted input gives an
/// unspecified but finite answer.
pub fn quantile_sorted(sorted_data: &[f64], p: f64) -> Option<f64> {
    let (first, last) = (sorted_data.first()?, sorted_data.last()?);
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted_data.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let frac = h - h.floor();
    match sorted_data.get(lo + 1) {
        _ if p == 0.0 => Some(*first),
        Some(&next) => Some(sorted_data[lo] + frac * (next - sorted_data[lo])),
        None => Some(*last),
    }
}

/// Share of points at or below `a`, the empirical CDF at one threshold.
///
/// A single scan, no sorting. For many thresholds on the same sample,
/// build an [`Ecdf`](crate::ecdf::Ecdf) instead. NaN points fail every
/// comparison and so count in the denominator only.
///
/// # Returns
/// - `None` if `data` is empty or `a` is NaN.
///
/// # Examples
/// ```
/// use u_probability::stats::proportion_at_or_below;
/// let heights = [60.0, 64.0, 68.0, 70.0, 75.0];
/// assert_eq!(proportion_at_or_below(&heights, 68.0), Some(0.6));
/// ```
pub fn proportion_at_or_below(data: &[f64], a: f64) -> Option<f64> {
    share(data, a, |x| x <= a)
}

/// Share of points strictly above `a`.
///
/// # Examples
/// ```
/// use u_probability::stats::proportion_above;
/// let heights = [60.0, 64.0, 68.0, 70.0, 75.0];
/// assert_eq!(proportion_above(&heights, 70.0), Some(0.2));
/// ```
pub fn proportion_above(data: &[f64], a: f64) -> Option<f64> {
    share(data, a, |x| x > a)
}

/// Share of points in `(a, b]`. Zero when `b ≤ a`.
///
/// # Examples
/// ```
/// use u_probability::stats::proportion_between;
/// let heights = [60.0, 64.0, 68.0, 70.0, 75.0];
/// assert_eq!(proportion_between(&heights, 64.0, 70.0), Some(0.4));
/// ```
pub fn proportion_between(data: &[f64], a: f64, b: f64) -> Option<f64> {
    if b.is_nan() {
        return None;
    }
    share(data, a, |x| a < x && x <= b)
}

fn share(data: &[f64], threshold: f64, hit: impl Fn(f64) -> bool) -> Option<f64> {
    if data.is_empty() || threshold.is_nan() {
        return None;
    }
    let hits = data.iter().filter(|&&x| hit(x)).count();
    Some(hits as f64 / data.len() as f64)
}

/// Compensated sum (Neumaier's variant of Kahan summation).
///
/// The running compensation picks up the low-order bits lost by whichever
/// addend is smaller in magnitude, so the error stays O(ε) however long
/// the input is.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let (sum, compensation) = data.iter().fold((0.0_f64, 0.0_f64), |(sum, comp), &x| {
        let t = sum + x;
        let lost = if sum.abs() >= x.abs() {
            (sum - t) + x
        } else {
            (x - t) + sum
        };
        (t, comp + lost)
    });
    sum + compensation
}

/// Running count, mean and sum of squared deviations in one pass
/// (Welford 1962).
///
/// The Monte Carlo estimators feed trial outcomes through this instead of
/// storing them. Two accumulators over disjoint chunks combine with
/// [`merge`](Self::merge).
///
/// # Examples
/// ```
/// use u_probability::stats::WelfordAccumulator;
/// let mut acc = WelfordAccumulator::new();
/// for h in [63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0] {
///     acc.update(h);
/// }
/// assert!((acc.mean().unwrap() - 68.5).abs() < 1e-12);
/// assert!((acc.population_variance().unwrap() - 13.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WelfordAccumulator {
    n: u64,
    mean: f64,
    /// Σ (xᵢ − mean)²
    m2: f64,
}

impl WelfordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.n += 1;
        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// `m2 / (n − 1)`; needs two values.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.n > 1).then(|| self.m2 / (self.n - 1) as f64)
    }

    /// `m2 / n`; needs one value.
    pub fn population_variance(&self) -> Option<f64> {
        (self.n > 0).then(|| self.m2 / self.n as f64)
    }

    pub fn sample_std_dev(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }

    /// Folds `other` in as if its values had been fed to `self`
    /// (Chan, Golub & LeVeque pairwise update).
    pub fn merge(&mut self, other: &WelfordAccumulator) {
        match (self.n, other.n) {
            (_, 0) => {}
            (0, _) => *self = *other,
            (na, nb) => {
                let n = (na + nb) as f64;
                let (wa, wb) = (na as f64, nb as f64);
                let delta = other.mean - self.mean;
                self.mean += delta * wb / n;
                self.m2 += other.m2 + delta * delta * wa * wb / n;
                self.n = na + nb;
            }
        }
    }
}

/// Location, spread and range of a sample at a glance.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1).
    pub sd: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl SampleSummary {
    /// `None` if fewer than 2 points or any point is non-finite.
    pub fn from_data(data: &[f64]) -> Option<Self> {
        Some(Self {
            n: data.len(),
            mean: mean(data)?,
            sd: std_dev(data)?,
            min: min(data)?,
            median: median(data)?,
            max: max(data)?,
        })
    }
}

impl fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} mean={:.4} sd={:.4} min={:.4} median={:.4} max={:.4}",
            self.n, self.mean, self.sd, self.min, self.median, self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHTS: [f64; 8] = [63.0, 65.0, 66.0, 68.0, 69.0, 70.0, 72.0, 75.0];

    #[test]
    fn test_location() {
        assert_eq!(mean(&HEIGHTS), Some(68.5));
        assert_eq!(median(&HEIGHTS), Some(68.5));
        assert_eq!(median(&[71.0]), Some(71.0));
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[68.0, f64::NAN]), None);
        assert_eq!(mean(&[68.0, f64::NEG_INFINITY]), None);
        assert_eq!(variance(&[68.0, f64::INFINITY, 70.0]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[70.0, f64::NAN]), None);
    }

    #[test]
    fn test_spread() {
        assert!((variance(&HEIGHTS).unwrap() - 15.142857142857142).abs() < 1e-12);
        assert!((population_variance(&HEIGHTS).unwrap() - 13.25).abs() < 1e-12);
        assert!((std_dev(&HEIGHTS).unwrap() - 3.8913824205360674).abs() < 1e-12);
    }

    #[test]
    fn test_spread_needs_two_points() {
        assert_eq!(variance(&[70.0]), None);
        assert_eq!(std_dev(&[70.0]), None);
        assert_eq!(population_std_dev(&[70.0]), Some(0.0));
    }

    #[test]
    fn test_spread_survives_large_offset() {
        let shifted: Vec<f64> = HEIGHTS.iter().map(|h| h + 1e9).collect();
        assert!((variance(&shifted).unwrap() - 15.142857142857142).abs() < 1e-5);
        let constant = [69.0; 50];
        assert_eq!(variance(&constant), Some(0.0));
    }

    #[test]
    fn test_extremes() {
        assert_eq!(min(&HEIGHTS), Some(63.0));
        assert_eq!(max(&HEIGHTS), Some(75.0));
        assert_eq!(min(&[-2.0, f64::INFINITY]), Some(-2.0));
    }

    #[test]
    fn test_quantile_interpolates_between_order_stats() {
        assert_eq!(quantile(&HEIGHTS, 0.25), Some(65.75));
        assert!((quantile(&HEIGHTS, 0.9).unwrap() - 72.9).abs() < 1e-12);
        assert_eq!(quantile(&HEIGHTS, 0.0), Some(63.0));
    }

    #[test]
    fn test_quantile_rejects_bad_input() {
        assert_eq!(quantile(&HEIGHTS, -0.01), None);
        assert_eq!(quantile(&HEIGHTS, 1.01), None);
        assert_eq!(quantile(&HEIGHTS, f64::NAN), None);
        assert_eq!(quantile(&[70.0, f64::NAN], 0.5), None);
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_proportions_at_threshold() {
        let tall = [66.0, 70.0, 70.0, 74.0];
        assert_eq!(proportion_at_or_below(&tall, 70.0), Some(0.75));
        assert_eq!(proportion_above(&tall, 70.0), Some(0.25));
        assert_eq!(proportion_at_or_below(&tall, 60.0), Some(0.0));
        assert_eq!(proportion_between(&tall, 66.0, 70.0), Some(0.5));
    }

    #[test]
    fn test_proportions_degenerate() {
        assert_eq!(proportion_at_or_below(&[], 70.0), None);
        assert_eq!(proportion_above(&[70.0], f64::NAN), None);
        assert_eq!(proportion_between(&[70.0], 60.0, f64::NAN), None);
        assert_eq!(proportion_between(&HEIGHTS, 70.0, 65.0), Some(0.0));
        assert_eq!(proportion_between(&HEIGHTS, 70.0, 70.0), Some(0.0));
        // NaN points sit in the denominator only.
        assert_eq!(proportion_at_or_below(&[64.0, f64::NAN], 80.0), Some(0.5));
    }

    #[test]
    fn test_kahan_sum_recovers_small_terms() {
        let data = [1.0, 1e100, 1.0, -1e100];
        assert_eq!(kahan_sum(&data), 2.0);
        assert_eq!(kahan_sum(&[]), 0.0);
    }

    #[test]
    fn test_accumulator_empty() {
        let acc = WelfordAccumulator::new();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.mean(), None);
        assert_eq!(acc.sample_variance(), None);
        assert_eq!(acc.population_variance(), None);
    }

    #[test]
    fn test_accumulator_merge_equals_one_pass() {
        let mut left = WelfordAccumulator::new();
        let mut right = WelfordAccumulator::new();
        HEIGHTS[..5].iter().for_each(|&h| left.update(h));
        HEIGHTS[5..].iter().for_each(|&h| right.update(h));
        left.merge(&right);
        assert_eq!(left.count(), 8);
        assert!((left.mean().unwrap() - 68.5).abs() < 1e-12);
        assert!((left.sample_variance().unwrap() - 15.142857142857142).abs() < 1e-10);

        let mut empty = WelfordAccumulator::new();
        empty.merge(&right);
        assert_eq!(empty, right);
        right.merge(&WelfordAccumulator::new());
        assert_eq!(right.count(), 3);
    }

    #[test]
    fn test_summary() {
        let s = SampleSummary::from_data(&[64.0, 66.0, 67.5, 70.0, 71.5]).unwrap();
        assert_eq!(s.n, 5);
        assert!((s.mean - 67.8).abs() < 1e-12);
        assert!((s.sd - 3.0124740662784135).abs() < 1e-12);
        assert_eq!((s.min, s.median, s.max), (64.0, 67.5, 71.5));
        assert!(s.to_string().starts_with("n=5 mean=67.8000"));
        assert!(SampleSummary::from_data(&[70.0]).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn heights(len: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(40.0_f64..90.0, len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn sd_squared_is_variance(data in heights(2..=100)) {
            let var = variance(&data).unwrap();
            prop_assert!(var >= 0.0);
            let sd = std_dev(&data).unwrap();
            prop_assert!((sd * sd - var).abs() < 1e-9 * var.max(1.0));
        }

        #[test]
        fn mean_lies_within_range(data in heights(1..=100)) {
            let m = mean(&data).unwrap();
            prop_assert!(min(&data).unwrap() <= m + 1e-9);
            prop_assert!(m <= max(&data).unwrap() + 1e-9);
        }

        #[test]
        fn quantile_endpoints_and_order(data in heights(1..=100), p in 0.0_f64..=1.0, q in 0.0_f64..=1.0) {
            prop_assert_eq!(quantile(&data, 0.0), min(&data));
            prop_assert_eq!(quantile(&data, 1.0), max(&data));
            let (lo, hi) = if p <= q { (p, q) } else { (q, p) };
            prop_assert!(quantile(&data, lo).unwrap() <= quantile(&data, hi).unwrap() + 1e-9);
        }

        #[test]
        fn below_and_above_sum_to_one(data in heights(1..=100), a in 30.0_f64..100.0) {
            let below = proportion_at_or_below(&data, a).unwrap();
            let above = proportion_above(&data, a).unwrap();
            prop_assert!((below + above - 1.0).abs() < 1e-12);
        }

        #[test]
        fn between_is_difference_of_cdf(data in heights(1..=100), a in 30.0_f64..100.0, w in 0.0_f64..20.0) {
            let b = a + w;
            let direct = proportion_between(&data, a, b).unwrap();
            let lo = proportion_at_or_below(&data, a).unwrap();
            let hi = proportion_at_or_below(&data, b).unwrap();
            prop_assert!(lo <= hi);
            prop_assert!((direct - (hi - lo)).abs() < 1e-12);
        }

        #[test]
        fn streaming_matches_two_pass(data in heights(2..=100), split in 0_usize..100) {
            let cut = split.min(data.len());
            let mut a = WelfordAccumulator::new();
            let mut b = WelfordAccumulator::new();
            data[..cut].iter().for_each(|&x| a.update(x));
            data[cut..].iter().for_each(|&x| b.update(x));
            a.merge(&b);
            let batch = variance(&data).unwrap();
            prop_assert!((a.sample_variance().unwrap() - batch).abs() < 1e-8 * batch.max(1.0));
        }
    }
}
