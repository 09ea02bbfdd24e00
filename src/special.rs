//! Special functions behind the normal and Student's t distributions.
//!
//! Everything here works on the standardized scale. A height `x` from
//! N(μ, σ) maps to `z = (x − μ)/σ`, and `Φ(z)` is the share of the
//! population at or below `x`. [`Normal`](crate::distributions::Normal)
//! does that bookkeeping.
//!
//! Out-of-domain arguments produce `f64::NAN` rather than a panic.

use std::f64::consts::{PI, SQRT_2};

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
const SQRT_2PI: f64 = 2.506_628_274_631_000_5;
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Normal density at the standardized value `z`.
///
/// ```
/// use u_probability::special::standard_normal_pdf;
/// // Density one SD from the mean.
/// assert!((standard_normal_pdf(1.0) - 0.24197072451914337).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(z: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * z * z).exp()
}

/// Φ(z), the standard normal CDF.
///
/// Hart's algorithm 5666 inside `|z| < 5√2`, a five-term continued
/// fraction beyond it (the arrangement in West, "Better approximations to
/// cumulative normal functions", 2005). Both branches compute the lower
/// tail `Φ(−|z|)` directly, so `1 − Φ(z)` for large `z` never has to be
/// recovered by subtraction.
///
/// Absolute error is near machine epsilon in the central region. The
/// result underflows to 0 or 1 past `|z| = 37`.
///
/// # Examples
/// ```
/// use u_probability::special::standard_normal_cdf;
/// assert_eq!(standard_normal_cdf(0.0), 0.5);
/// assert!((standard_normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-14);
/// ```
pub fn standard_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    let lower = lower_tail(z.abs());
    if z > 0.0 {
        1.0 - lower
    } else {
        lower
    }
}

/// Φ(−a) for `a ≥ 0`.
fn lower_tail(a: f64) -> f64 {
    const HART_CUTOFF: f64 = 7.071_067_811_865_47;
    const P: [f64; 7] = [
        3.526_249_659_989_11e-2,
        0.700_383_064_443_688,
        6.373_962_203_531_65,
        33.912_866_078_383,
        112.079_291_497_871,
        221.213_596_169_931,
        220.206_867_912_376,
    ];
    const Q: [f64; 8] = [
        8.838_834_764_831_84e-2,
        1.755_667_163_182_64,
        16.064_177_579_207,
        86.780_732_202_946_1,
        296.564_248_779_674,
        637.333_633_378_831,
        793.826_512_519_948,
        440.413_735_824_752,
    ];

    if a > 37.0 {
        return 0.0;
    }
    let gauss = (-0.5 * a * a).exp();
    if a < HART_CUTOFF {
        gauss * horner(&P, a) / horner(&Q, a)
    } else {
        let cf = [4.0, 3.0, 2.0, 1.0]
            .iter()
            .fold(a + 0.65, |acc, &k| a + k / acc);
        gauss / (cf * SQRT_2PI)
    }
}

/// Evaluates a polynomial with coefficients from the highest degree down.
fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Φ⁻¹(p), the standard normal quantile.
///
/// Acklam's rational approximation (relative error about 1.15 × 10⁻⁹)
/// with breakpoints at `p = 0.02425` and `1 − 0.02425`, polished by one
/// Halley step against [`standard_normal_cdf`]. After the step the round
/// trip `Φ(Φ⁻¹(p))` agrees with `p` to about 1e-15.
///
/// # Returns
/// - `-inf` for `p = 0`, `+inf` for `p = 1`.
/// - NaN outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_probability::special::inverse_normal_cdf;
/// // Half the population lies below the mean.
/// assert_eq!(inverse_normal_cdf(0.5), 0.0);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-12);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 6] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
        1.0,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 5] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
        1.0,
    ];
    const BREAK: f64 = 0.02425;

    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    let tail = |q: f64| {
        let s = (-2.0 * q.ln()).sqrt();
        horner(&C, s) / horner(&D, s)
    };
    let z = if p < BREAK {
        tail(p)
    } else if p > 1.0 - BREAK {
        -tail(1.0 - p)
    } else {
        let q = p - 0.5;
        q * horner(&A, q * q) / horner(&B, q * q)
    };

    let err = standard_normal_cdf(z) - p;
    let u = err * SQRT_2PI * (0.5 * z * z).exp();
    z - u / (1.0 + 0.5 * z * u)
}

/// erf(x) = 2Φ(x√2) − 1.
///
/// Computed as `±(1 − erfc(|x|))`, which keeps the result exactly odd.
///
/// ```
/// use u_probability::special::erf;
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-12);
/// ```
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    (1.0 - erfc(x.abs())).copysign(x)
}

/// erfc(x) = 1 − erf(x) = 2Φ(−x√2), accurate in the upper tail where
/// `1.0 - erf(x)` would cancel to zero.
///
/// ```
/// use u_probability::special::erfc;
/// assert!((erfc(3.0) - 2.209049699858544e-5).abs() < 1e-15);
/// ```
pub fn erfc(x: f64) -> f64 {
    2.0 * standard_normal_cdf(-x * SQRT_2)
}

const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)]
const LANCZOS: [f64; 9] = [
    0.99999999999980993,
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// ln Γ(x) by the Lanczos series (g = 7, nine terms), with the reflection
/// formula below 1/2. Relative error around 1e-15 for positive `x`.
///
/// ```
/// use u_probability::special::ln_gamma;
/// // Γ(6) = 5! = 120
/// assert!((ln_gamma(6.0) - 120.0_f64.ln()).abs() < 1e-12);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let z = x - 1.0;
    let series = LANCZOS[1..]
        .iter()
        .zip(1_i32..)
        .fold(LANCZOS[0], |acc, (&c, k)| acc + c / (z + f64::from(k)));
    let t = z + LANCZOS_G + 0.5;
    LN_SQRT_2PI + (z + 0.5) * t.ln() - t + series.ln()
}

/// ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a + b).
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Regularized incomplete beta `I_x(a, b)`.
///
/// Evaluated by the continued fraction of Numerical Recipes §6.4 using
/// the modified Lentz method. Above `x = (a+1)/(a+b+2)` the fraction
/// converges slowly, so the symmetric form `1 − I_{1−x}(b, a)` is used.
///
/// ```
/// use u_probability::special::regularized_incomplete_beta;
/// // I_x(1, 1) is the uniform CDF.
/// assert!((regularized_incomplete_beta(0.3, 1.0, 1.0) - 0.3).abs() < 1e-12);
/// assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
/// ```
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || a.is_nan() || b.is_nan() || a <= 0.0 || b <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
    }
    let front = (a * x.ln() + b * (1.0 - x).ln() - ln_beta(a, b)).exp() / a;
    front * beta_continued_fraction(x, a, b)
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_TERMS: usize = 300;
    const TOLERANCE: f64 = 1e-15;
    const FLOOR: f64 = 1e-300;
    let guard = |v: f64| if v.abs() < FLOOR { FLOOR } else { v };

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - (a + b) * x / (a + 1.0));
    let mut frac = d;
    for m in 1..=MAX_TERMS {
        let m = m as f64;
        let two_m = 2.0 * m;
        let even = m * (b - m) * x / ((a + two_m - 1.0) * (a + two_m));
        let odd = -(a + m) * (a + b + m) * x / ((a + two_m) * (a + two_m + 1.0));

        let mut step = 1.0;
        for coeff in [even, odd] {
            d = 1.0 / guard(1.0 + coeff * d);
            c = guard(1.0 + coeff / c);
            step = d * c;
            frac *= step;
        }
        if (step - 1.0).abs() < TOLERANCE {
            break;
        }
    }
    frac
}

/// Student's t CDF with `df` degrees of freedom.
///
/// With `x = df/(df + t²)`, the lower tail beyond `−|t|` is
/// `I_x(df/2, 1/2) / 2`. NaN for `df ≤ 0`.
///
/// ```
/// use u_probability::special::t_distribution_cdf;
/// assert_eq!(t_distribution_cdf(0.0, 4.0), 0.5);
/// // One degree of freedom is the Cauchy distribution.
/// assert!((t_distribution_cdf(1.0, 1.0) - 0.75).abs() < 1e-12);
/// ```
pub fn t_distribution_cdf(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if t == 0.0 {
        return 0.5;
    }
    let lower = if t.is_infinite() {
        0.0
    } else {
        0.5 * regularized_incomplete_beta(df / (df + t * t), 0.5 * df, 0.5)
    };
    if t > 0.0 {
        1.0 - lower
    } else {
        lower
    }
}

/// Student's t density,
/// `Γ((ν+1)/2) / (√(νπ) Γ(ν/2)) · (1 + t²/ν)^(−(ν+1)/2)`.
pub fn t_distribution_pdf(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    let half = 0.5 * df;
    let ln_norm = ln_gamma(half + 0.5) - ln_gamma(half) - 0.5 * (df * PI).ln();
    (ln_norm - (half + 0.5) * (t * t / df).ln_1p()).exp()
}

/// Student's t quantile.
///
/// Solves for the upper-tail point `t ≥ 0` whose tail area matches, then
/// mirrors it for `p < 1/2`. The root is bracketed by doubling and found
/// by Newton steps that fall back to bisection whenever a step would
/// leave the bracket, starting from the normal quantile.
///
/// # Returns
/// - NaN unless `0 < p < 1` and `df > 0`.
///
/// ```
/// use u_probability::special::t_distribution_quantile;
/// // Two-sided 95% critical value with 10 degrees of freedom.
/// assert!((t_distribution_quantile(0.975, 10.0) - 2.2281388519649385).abs() < 1e-9);
/// ```
pub fn t_distribution_quantile(p: f64, df: f64) -> f64 {
    if !(p > 0.0 && p < 1.0 && df > 0.0) {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    let upper = p > 0.5;
    let tail = if upper { 1.0 - p } else { p };
    // Upper-tail area beyond t, decreasing in t.
    let survival = |t: f64| t_distribution_cdf(-t, df);

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    while survival(hi) > tail {
        lo = hi;
        hi *= 2.0;
    }

    let mut t = inverse_normal_cdf(1.0 - tail).clamp(lo, hi);
    for _ in 0..200 {
        let gap = survival(t) - tail;
        if gap > 0.0 {
            lo = t;
        } else {
            hi = t;
        }
        let density = t_distribution_pdf(t, df);
        let newton = t + gap / density;
        let next = if density > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        let done = (next - t).abs() <= 1e-14 * next.abs().max(1.0);
        t = next;
        if done {
            break;
        }
    }
    if upper {
        t
    } else {
        -t
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn cdf_is_a_probability(z in -50.0_f64..50.0) {
            let c = standard_normal_cdf(z);
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn cdf_nondecreasing(a in -9.0_f64..9.0, b in -9.0_f64..9.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(standard_normal_cdf(lo) <= standard_normal_cdf(hi));
        }

        #[test]
        fn quantile_then_cdf_is_identity(p in 1e-6_f64..0.999999) {
            let back = standard_normal_cdf(inverse_normal_cdf(p));
            prop_assert!((back - p).abs() < 1e-14, "p={p}: {back}");
        }

        #[test]
        fn incomplete_beta_reflects(x in 0.01_f64..0.99, a in 0.5_f64..10.0, b in 0.5_f64..10.0) {
            let left = regularized_incomplete_beta(x, a, b);
            let right = regularized_incomplete_beta(1.0 - x, b, a);
            prop_assert!((left + right - 1.0).abs() < 1e-8);
        }

        #[test]
        fn t_cdf_mirror(t in 0.01_f64..10.0, df in 1.0_f64..50.0) {
            let total = t_distribution_cdf(t, df) + t_distribution_cdf(-t, df);
            prop_assert!((total - 1.0).abs() < 1e-12);
        }

        #[test]
        fn erf_is_odd(x in 0.0_f64..5.0) {
            prop_assert_eq!(erf(-x), -erf(x));
        }
    }
}
