//! Special mathematical functions.
//!
//! Numerical approximations of the standard functions the distribution
//! models are built on: the error function, the standard normal density,
//! CDF and quantile, the log-gamma and log-beta functions, and the
//! regularized incomplete beta function.

use std::f64::consts::{PI, SQRT_2};

/// 1/√(2π) ≈ 0.3989422804014327
#[allow(clippy::excessive_precision)]
pub(crate) const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

// ============================================================================
// Error Function
// ============================================================================

/// Error function erf(x).
///
/// # Definition
/// ```text
/// erf(x) = (2/√π) ∫₀ˣ exp(-t²) dt
/// ```
///
/// # Algorithm
/// Abramowitz & Stegun formula 7.1.26, maximum absolute error < 1.5 × 10⁻⁷.
///
/// # Examples
/// ```
/// use u_stats::special::erf;
/// assert!(erf(0.0).abs() < 1e-7);
/// assert!((erf(1.0) - 0.8427007929).abs() < 1e-6);
/// ```
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    // Odd function: pin the origin exactly.
    if x == 0.0 {
        return 0.0;
    }
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    const P: f64 = 0.3275911;
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;

    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// # Examples
/// ```
/// use u_stats::special::erfc;
/// assert!((erfc(0.0) - 1.0).abs() < 1e-7);
/// assert!(erfc(3.0) < 1e-4);
/// ```
pub fn erfc(x: f64) -> f64 {
    1.0 - erf(x)
}

// ============================================================================
// Standard Normal
// ============================================================================

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
///
/// # Examples
/// ```
/// use u_stats::special::standard_normal_pdf;
/// let peak = standard_normal_pdf(0.0);
/// assert!((peak - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF Φ(x) = ½·erfc(−x/√2).
///
/// Inherits the 1.5 × 10⁻⁷ absolute error bound of [`erf`], halved.
///
/// # Examples
/// ```
/// use u_stats::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * erfc(-x / SQRT_2)
}

/// Inverse of the standard normal CDF (quantile function).
///
/// Given a probability `p ∈ (0, 1)`, returns `z` such that `Φ(z) = p`.
///
/// # Algorithm
/// Peter J. Acklam's rational approximation. The unit interval is split at
/// `p_low = 0.02425` and `1 − p_low`; the tails use rational functions of
/// `√(−2 ln q)` and the central region a rational function of `(p − ½)²`.
/// No refinement step is applied.
///
/// # Accuracy
/// Relative error < 1.15 × 10⁻⁹ over the whole domain.
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` if `p == 0.0`.
/// - `f64::INFINITY` if `p == 1.0`.
///
/// # Examples
/// ```
/// use u_stats::special::inverse_normal_cdf;
/// assert_eq!(inverse_normal_cdf(0.5), 0.0);
/// assert!((inverse_normal_cdf(0.975) - 1.959963985).abs() < 1e-8);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    #[allow(clippy::excessive_precision)]
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    #[allow(clippy::excessive_precision)]
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    // Tail rational function in q = √(−2 ln p).
    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

// ============================================================================
// Gamma / Beta
// ============================================================================

/// Lanczos approximation of ln Γ(x).
///
/// For `x < 0.5` the reflection formula `ln Γ(x) = ln(π / sin(πx)) − ln Γ(1−x)`
/// keeps the result accurate near the pole at zero.
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0.
///
/// # Examples
/// ```
/// use u_stats::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
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
    const G: f64 = 7.0;

    if x < 0.5 {
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Log of the Beta function: `ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a+b)`.
///
/// # Examples
/// ```
/// use u_stats::special::ln_beta;
/// // B(1,1) = 1, so ln B(1,1) = 0
/// assert!(ln_beta(1.0, 1.0).abs() < 1e-10);
/// ```
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Regularized incomplete beta function I_x(a, b).
///
/// # Definition
/// ```text
/// I_x(a, b) = B(x; a, b) / B(a, b)
/// ```
///
/// # Algorithm
/// When `x > (a+1)/(a+b+2)` the symmetry relation
/// `I_x(a,b) = 1 − I_{1−x}(b,a)` is applied so the continued fraction
/// converges quickly. Otherwise the leading factor
/// `xᵃ(1−x)ᵇ / (a·B(a,b))` is formed in log space and multiplied by the
/// continued fraction, evaluated with the modified Lentz algorithm.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.4.
///
/// # Examples
/// ```
/// use u_stats::special::regularized_incomplete_beta;
/// assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
/// assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
/// assert!((regularized_incomplete_beta(0.5, 1.0, 1.0) - 0.5).abs() < 1e-10);
/// ```
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || a.is_nan() || b.is_nan() {
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

    let ln_prefix = a * x.ln() + b * (1.0 - x).ln() - ln_beta(a, b);
    (ln_prefix.exp() / a) * beta_cf(x, a, b)
}

/// Continued fraction for the incomplete beta function (modified Lentz).
///
/// Non-convergence within the iteration cap is not an error: the current
/// estimate is returned.
fn beta_cf(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-30;

    let floor = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / floor(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        // Even step
        let aa = m_f * (b - m_f) * x / ((qam + m2) * (a + m2));
        d = 1.0 / floor(1.0 + aa * d);
        c = floor(1.0 + aa / c);
        h *= d * c;

        // Odd step
        let aa = -(a + m_f) * (qab + m_f) * x / ((a + m2) * (qap + m2));
        d = 1.0 / floor(1.0 + aa * d);
        c = floor(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            return h;
        }
    }

    log::debug!(
        "incomplete beta continued fraction hit {MAX_ITER} iterations (x={x}, a={a}, b={b})"
    );
    h
}

// ============================================================================
// Root Finding
// ============================================================================

/// Solves `f(x) = target` by Newton–Raphson, starting at `x0`.
///
/// Each iterate is clamped into `[lo, hi]`. Iteration stops when the step
/// falls below 10⁻¹², after `max_iter` steps, or when `|f'(x)| < 10⁻¹⁵`.
/// The last two cases return the current estimate without signalling
/// failure.
pub(crate) fn newton_raphson<F, D>(
    target: f64,
    x0: f64,
    (lo, hi): (f64, f64),
    max_iter: usize,
    f: F,
    f_prime: D,
) -> f64
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    const STEP_TOL: f64 = 1e-12;
    const MIN_SLOPE: f64 = 1e-15;

    let mut x = x0.clamp(lo, hi);
    for _ in 0..max_iter {
        let slope = f_prime(x);
        if slope.abs() < MIN_SLOPE {
            log::debug!("newton_raphson: derivative underflow at x={x}, target={target}");
            return x;
        }
        let step = (f(x) - target) / slope;
        x = (x - step).clamp(lo, hi);
        if step.abs() < STEP_TOL {
            return x;
        }
    }
    log::debug!("newton_raphson: no convergence after {max_iter} iterations, target={target}");
    x
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(400))]

        #[test]
        fn erf_is_odd_and_bounded(x in -8.0_f64..8.0) {
            let e = erf(x);
            prop_assert!((-1.0..=1.0).contains(&e));
            prop_assert_eq!(e, -erf(-x));
        }

        #[test]
        fn normal_cdf_non_decreasing(a in -9.0_f64..9.0, b in -9.0_f64..9.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(standard_normal_cdf(lo) <= standard_normal_cdf(hi));
        }

        #[test]
        fn inverse_normal_tracks_cdf(p in 1e-6_f64..(1.0 - 1e-6)) {
            let z = inverse_normal_cdf(p);
            // limited by the erf approximation, not by the inverse
            prop_assert!((standard_normal_cdf(z) - p).abs() < 1e-7);
        }

        #[test]
        fn inverse_normal_increasing(p in 1e-6_f64..0.99, dp in 1e-4_f64..0.01) {
            prop_assert!(inverse_normal_cdf(p) < inverse_normal_cdf(p + dp));
        }

        #[test]
        fn inc_beta_reflection(x in 0.01_f64..0.99, a in 0.5_f64..30.0, b in 0.5_f64..30.0) {
            let ix = regularized_incomplete_beta(x, a, b);
            prop_assert!((0.0..=1.0).contains(&ix));
            let mirrored = regularized_incomplete_beta(1.0 - x, b, a);
            prop_assert!((ix + mirrored - 1.0).abs() < 1e-10, "{} + {}", ix, mirrored);
        }

        #[test]
        fn inc_beta_increasing_in_x(x in 0.01_f64..0.9, a in 0.5_f64..10.0, b in 0.5_f64..10.0) {
            let lo = regularized_incomplete_beta(x, a, b);
            let hi = regularized_incomplete_beta(x + 0.05, a, b);
            prop_assert!(lo <= hi);
        }
    }
}
