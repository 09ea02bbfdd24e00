//! Seeded generators and sample drawing.
//!
//! Every simulation in the crate is driven by an explicit `u64` seed; two
//! runs with the same seed on the same platform see the same draws.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::distributions::{ContinuousDistribution, Normal, Uniform};
use crate::error::Result;

/// `SmallRng` seeded from `seed`. Not suitable for cryptography.
///
/// ```
/// use rand::Rng;
/// use u_probability::random::create_rng;
/// let first: u32 = create_rng(800).random();
/// let again: u32 = create_rng(800).random();
/// assert_eq!(first, again);
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Draws `n` independent N(μ, σ) variates.
///
/// # Errors
/// Propagates the parameter check of [`Normal::new`].
///
/// # Examples
/// ```
/// use u_probability::random::{create_rng, normal_sample};
/// let mut rng = create_rng(1);
/// let simulated = normal_sample(800, 69.3, 3.6, &mut rng).unwrap();
/// assert_eq!(simulated.len(), 800);
/// ```
pub fn normal_sample<R: Rng + ?Sized>(
    n: usize,
    mu: f64,
    sigma: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    Ok(Normal::new(mu, sigma)?.sample_n(n, rng))
}

/// Draws `n` independent values uniformly from `[min, max)`.
///
/// # Errors
/// Propagates the parameter check of [`Uniform::new`].
pub fn uniform_sample<R: Rng + ?Sized>(
    n: usize,
    min: f64,
    max: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    Ok(Uniform::new(min, max)?.sample_n(n, rng))
}

/// Draws `n` elements from `data` with replacement, each position chosen
/// uniformly.
///
/// `None` when there is nothing to draw from but draws were requested.
///
/// ```
/// use u_probability::random::{create_rng, sample_with_replacement};
/// let mut rng = create_rng(42);
/// let draws = sample_with_replacement(&[1, 2, 3], 10, &mut rng).unwrap();
/// assert_eq!(draws.len(), 10);
/// assert!(draws.iter().all(|d| [1, 2, 3].contains(d)));
/// ```
pub fn sample_with_replacement<T: Clone, R: Rng + ?Sized>(
    data: &[T],
    n: usize,
    rng: &mut R,
) -> Option<Vec<T>> {
    if n == 0 {
        return Some(Vec::new());
    }
    if data.is_empty() {
        return None;
    }
    Some(
        (0..n)
            .map(|_| data[rng.random_range(0..data.len())].clone())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn test_seeds_select_streams() {
        let draw = |seed| -> Vec<u64> {
            let mut rng = create_rng(seed);
            (0..4).map(|_| rng.random()).collect()
        };
        assert_eq!(draw(42), draw(42));
        assert_ne!(draw(42), draw(43));
    }

    #[test]
    fn test_normal_sample_reproducible() {
        let a = normal_sample(50, 0.0, 1.0, &mut create_rng(9)).unwrap();
        let b = normal_sample(50, 0.0, 1.0, &mut create_rng(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normal_sample_invalid() {
        let mut rng = create_rng(0);
        assert!(normal_sample(10, 0.0, 0.0, &mut rng).is_err());
    }

    #[test]
    fn test_normal_sample_empirical_rule() {
        let mut rng = create_rng(2024);
        let x = normal_sample(10_000, 0.0, 1.0, &mut rng).unwrap();
        let within = stats::proportion_between(&x, -1.0, 1.0).unwrap();
        assert!((within - 0.6827).abs() < 0.02, "within one sd: {within}");
    }

    #[test]
    fn test_uniform_sample_bounds() {
        let mut rng = create_rng(5);
        let x = uniform_sample(1_000, 2.0, 3.0, &mut rng).unwrap();
        assert!(x.iter().all(|v| (2.0..3.0).contains(v)));
        assert!(uniform_sample(1, 3.0, 2.0, &mut rng).is_err());
    }

    #[test]
    fn test_sample_with_replacement_empty() {
        let mut rng = create_rng(42);
        let empty: [i32; 0] = [];
        assert_eq!(sample_with_replacement(&empty, 3, &mut rng), None);
        assert_eq!(sample_with_replacement(&empty, 0, &mut rng), Some(vec![]));
    }

    #[test]
    fn test_sample_with_replacement_repeats() {
        let mut rng = create_rng(42);
        let draws = sample_with_replacement(&["a", "b"], 100, &mut rng).unwrap();
        assert!(draws.contains(&"a"));
        assert!(draws.contains(&"b"));
    }
}
