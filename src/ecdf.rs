//! Empirical cumulative distribution function.
//!
//! For a sample of `n` values, `F(a) = #{xᵢ ≤ a} / n`. The ECDF is a
//! right-continuous step function that jumps by `k/n` at each value
//! observed `k` times. It needs no bin width and discards no information,
//! which makes it the natural way to describe a list of measurements
//! before reaching for a theoretical model.

use crate::error::{check_finite, ProbError, Result};

/// Empirical CDF over a finite, non-empty sample.
///
/// # Examples
/// ```
/// use u_probability::ecdf::Ecdf;
/// let ecdf = Ecdf::new(&[70.0, 64.0, 68.0, 68.0, 75.0]).unwrap();
/// assert_eq!(ecdf.evaluate(68.0), 0.6);
/// assert_eq!(ecdf.evaluate(63.9), 0.0);
/// assert_eq!(ecdf.prob_above(70.0), 0.2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Ecdf {
    sorted: Vec<f64>,
}

impl Ecdf {
    /// Builds the ECDF of `data`.
    ///
    /// # Complexity
    /// O(n log n) for the sort; every query afterwards is O(log n).
    ///
    /// # Errors
    /// - [`ProbError::EmptySample`] if `data` is empty.
    /// - [`ProbError::NonFiniteValue`] if any value is NaN or infinite.
    pub fn new(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(ProbError::EmptySample);
        }
        check_finite(data)?;
        let mut sorted = data.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);
        Ok(Self { sorted })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Always `false`; construction rejects empty samples.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// The sample in non-decreasing order.
    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted
    }

    fn count_at_or_below(&self, a: f64) -> usize {
        self.sorted.partition_point(|&x| x <= a)
    }

    /// `F(a)`: the proportion of sample points at or below `a`.
    ///
    /// Returns NaN for a NaN threshold.
    pub fn evaluate(&self, a: f64) -> f64 {
        if a.is_nan() {
            return f64::NAN;
        }
        self.count_at_or_below(a) as f64 / self.sorted.len() as f64
    }

    /// `1 − F(a)`: the proportion strictly above `a`.
    pub fn prob_above(&self, a: f64) -> f64 {
        if a.is_nan() {
            return f64::NAN;
        }
        let above = self.sorted.len() - self.count_at_or_below(a);
        above as f64 / self.sorted.len() as f64
    }

    /// `F(b) − F(a)`: the proportion in `(a, b]`. Zero when `b ≤ a`.
    pub fn prob_between(&self, a: f64, b: f64) -> f64 {
        if a.is_nan() || b.is_nan() {
            return f64::NAN;
        }
        if b <= a {
            return 0.0;
        }
        let hits = self.count_at_or_below(b) - self.count_at_or_below(a);
        hits as f64 / self.sorted.len() as f64
    }

    /// Generalized inverse: the smallest sample value `x` with `F(x) ≥ p`.
    ///
    /// `quantile(0.0)` is the sample minimum.
    ///
    /// # Returns
    /// - `None` if `p` is outside `[0, 1]` or NaN.
    ///
    /// # Examples
    /// ```
    /// use u_probability::ecdf::Ecdf;
    /// let ecdf = Ecdf::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(ecdf.quantile(0.5), Some(2.0));
    /// assert_eq!(ecdf.quantile(0.51), Some(3.0));
    /// assert_eq!(ecdf.quantile(1.0), Some(4.0));
    /// ```
    pub fn quantile(&self, p: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&p) {
            return None;
        }
        let n = self.sorted.len();
        let nf = n as f64;
        // smallest k (1-based) with k/n ≥ p; the product may be off by an
        // ulp, so settle the index against the same division `evaluate` uses
        let k = (p * nf).ceil() as usize;
        let mut idx = k.saturating_sub(1).min(n - 1);
        while idx > 0 && idx as f64 / nf >= p {
            idx -= 1;
        }
        while idx + 1 < n && ((idx + 1) as f64 / nf) < p {
            idx += 1;
        }
        Some(self.sorted[idx])
    }

    /// Distinct jump points `(x, F(x))` in ascending order.
    ///
    /// The last point always has `F = 1`.
    pub fn steps(&self) -> Vec<(f64, f64)> {
        let n = self.sorted.len() as f64;
        let mut steps: Vec<(f64, f64)> = Vec::new();
        for (i, &x) in self.sorted.iter().enumerate() {
            let f = (i + 1) as f64 / n;
            match steps.last_mut() {
                Some(last) if last.0 == x => last.1 = f,
                _ => steps.push((x, f)),
            }
        }
        steps
    }
}
