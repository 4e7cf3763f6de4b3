//! Kernel density estimation.
//!
//! Smooths a finite sample into a continuous density by centring a scaled
//! kernel on every observation:
//!
//! ```text
//! f̂(x) = (1/(n·h)) Σᵢ K((x − xᵢ)/h)
//! F̂(x) = (1/n)     Σᵢ K_cdf((x − xᵢ)/h)
//! ```
//!
//! Drawing from the estimate picks an observation uniformly and adds
//! `h` times a deviate from the standard kernel, which samples the
//! mixture exactly.
//!
//! Reference: Silverman (1986), *Density Estimation for Statistics and
//! Data Analysis*, Chapman & Hall.
//!
//! # Examples
//!
//! ```
//! use u_stats::kde::{kde, Kernel};
//!
//! let sample = [-2.1, -1.3, -0.4, 1.9, 5.1, 6.2];
//! let f_hat = kde(&sample, 1.5, Kernel::Normal, false).unwrap();
//! assert!((f_hat(2.5) - 0.0619).abs() < 1e-3);
//! ```

use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::{Result, StatsError};
use crate::random::{self, StatsRng};
use crate::special;

// ============================================================================
// Kernels
// ============================================================================

/// Smoothing kernel.
///
/// Four variants are alternative names for a canonical kernel and produce
/// identical estimates: `Gauss` ↔ `Normal`, `Uniform` ↔ `Rectangular`,
/// `Epanechnikov` ↔ `Parabolic`, `Biweight` ↔ `Quartic`.
///
/// | Kernel | K(t) | Support |
/// |---|---|---|
/// | Normal | e^(−t²/2)/√(2π) | ℝ |
/// | Logistic | 1/(2 + 2cosh t) | ℝ |
/// | Sigmoid | 1/(π cosh t) | ℝ |
/// | Rectangular | 1/2 | \[−1, 1\] |
/// | Triangular | 1 − \|t\| | \[−1, 1\] |
/// | Parabolic | ¾(1 − t²) | \[−1, 1\] |
/// | Quartic | 15/16 (1 − t²)² | \[−1, 1\] |
/// | Triweight | 35/32 (1 − t²)³ | \[−1, 1\] |
/// | Cosine | π/4 cos(πt/2) | \[−1, 1\] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Kernel {
    #[default]
    Normal,
    Gauss,
    Logistic,
    Sigmoid,
    Rectangular,
    Uniform,
    Triangular,
    Parabolic,
    Epanechnikov,
    Quartic,
    Biweight,
    Triweight,
    Cosine,
}

impl Kernel {
    /// The nine distinct kernels, without aliases.
    pub const CANONICAL: [Kernel; 9] = [
        Kernel::Normal,
        Kernel::Logistic,
        Kernel::Sigmoid,
        Kernel::Rectangular,
        Kernel::Triangular,
        Kernel::Parabolic,
        Kernel::Quartic,
        Kernel::Triweight,
        Kernel::Cosine,
    ];

    /// Resolves an alias to the kernel it names.
    pub fn canonical(self) -> Kernel {
        match self {
            Kernel::Gauss => Kernel::Normal,
            Kernel::Uniform => Kernel::Rectangular,
            Kernel::Epanechnikov => Kernel::Parabolic,
            Kernel::Biweight => Kernel::Quartic,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Normal => "normal",
            Kernel::Gauss => "gauss",
            Kernel::Logistic => "logistic",
            Kernel::Sigmoid => "sigmoid",
            Kernel::Rectangular => "rectangular",
            Kernel::Uniform => "uniform",
            Kernel::Triangular => "triangular",
            Kernel::Parabolic => "parabolic",
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Quartic => "quartic",
            Kernel::Biweight => "biweight",
            Kernel::Triweight => "triweight",
            Kernel::Cosine => "cosine",
        }
    }

    /// Half-width of the support, or `None` for unbounded kernels.
    pub fn support(self) -> Option<f64> {
        match self.canonical() {
            Kernel::Normal | Kernel::Logistic | Kernel::Sigmoid => None,
            _ => Some(1.0),
        }
    }

    /// Standard kernel density `K(t)`.
    pub fn density(self, t: f64) -> f64 {
        if self.support().is_some() && t.abs() > 1.0 {
            return 0.0;
        }
        match self {
            Kernel::Normal | Kernel::Gauss => special::standard_normal_pdf(t),
            Kernel::Logistic => 0.5 / (1.0 + t.cosh()),
            Kernel::Sigmoid => 1.0 / PI / t.cosh(),
            Kernel::Rectangular | Kernel::Uniform => 0.5,
            Kernel::Triangular => 1.0 - t.abs(),
            Kernel::Parabolic | Kernel::Epanechnikov => 0.75 * (1.0 - t * t),
            Kernel::Quartic | Kernel::Biweight => 15.0 / 16.0 * (1.0 - t * t).powi(2),
            Kernel::Triweight => 35.0 / 32.0 * (1.0 - t * t).powi(3),
            Kernel::Cosine => FRAC_PI_4 * (FRAC_PI_2 * t).cos(),
        }
    }

    /// Standard kernel CDF `∫₋∞ᵗ K(u) du`.
    pub fn cumulative(self, t: f64) -> f64 {
        if self.support().is_some() {
            if t <= -1.0 {
                return 0.0;
            }
            if t >= 1.0 {
                return 1.0;
            }
        }
        match self {
            Kernel::Normal | Kernel::Gauss => special::standard_normal_cdf(t),
            Kernel::Logistic => 1.0 - 1.0 / (1.0 + t.exp()),
            Kernel::Sigmoid => FRAC_2_PI * t.exp().atan(),
            Kernel::Rectangular | Kernel::Uniform => 0.5 * t + 0.5,
            Kernel::Triangular => {
                if t < 0.0 {
                    t * t / 2.0 + t + 0.5
                } else {
                    -t * t / 2.0 + t + 0.5
                }
            }
            Kernel::Parabolic | Kernel::Epanechnikov => -0.25 * t.powi(3) + 0.75 * t + 0.5,
            Kernel::Quartic | Kernel::Biweight => {
                3.0 / 16.0 * t.powi(5) - 5.0 / 8.0 * t.powi(3) + 15.0 / 16.0 * t + 0.5
            }
            Kernel::Triweight => {
                35.0 / 32.0 * (-t.powi(7) / 7.0 + 3.0 * t.powi(5) / 5.0 - t.powi(3) + t) + 0.5
            }
            Kernel::Cosine => 0.5 * (FRAC_PI_2 * t).sin() + 0.5,
        }
    }

    /// Standard kernel quantile, the inverse of [`cumulative`](Self::cumulative).
    ///
    /// Quartic and triweight have no closed form; a polynomial estimate is
    /// polished by Newton–Raphson on `[−1, 1]`.
    ///
    /// # Errors
    /// [`StatsError::InvalidParameters`] unless `0 < p < 1`.
    pub fn quantile(self, p: f64) -> Result<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(StatsError::invalid(format!(
                "p must be in the open interval (0, 1), got {p}"
            )));
        }
        Ok(self.quantile_unchecked(p))
    }

    fn quantile_unchecked(self, p: f64) -> f64 {
        match self {
            Kernel::Normal | Kernel::Gauss => special::inverse_normal_cdf(p),
            Kernel::Logistic => (p / (1.0 - p)).ln(),
            Kernel::Sigmoid => (p * FRAC_PI_2).tan().ln(),
            Kernel::Rectangular | Kernel::Uniform => 2.0 * p - 1.0,
            Kernel::Triangular => {
                if p < 0.5 {
                    (2.0 * p).sqrt() - 1.0
                } else {
                    1.0 - (2.0 - 2.0 * p).sqrt()
                }
            }
            Kernel::Parabolic | Kernel::Epanechnikov => {
                2.0 * ((2.0 * p - 1.0).asin() / 3.0).sin()
            }
            Kernel::Quartic | Kernel::Biweight => self.polish(p, quartic_estimate(p)),
            Kernel::Triweight => self.polish(p, triweight_estimate(p)),
            Kernel::Cosine => 2.0 * (2.0 * p - 1.0).asin() / PI,
        }
    }

    fn polish(self, p: f64, estimate: f64) -> f64 {
        special::newton_raphson(
            p,
            estimate,
            (-1.0, 1.0),
            100,
            |t| self.cumulative(t),
            |t| self.density(t),
        )
    }

    /// Draws one deviate from the standard kernel.
    fn deviate<R: Rng>(self, rng: &mut R) -> f64 {
        if self.canonical() == Kernel::Normal {
            return random::box_muller(rng).0;
        }
        let p = loop {
            let u: f64 = rng.random();
            if u > 0.0 {
                break u;
            }
        };
        self.quantile_unchecked(p)
    }
}

/// Mirrors `p` into the lower half so the estimates below only need to
/// cover `(0, ½]`.
fn fold(p: f64) -> (f64, f64) {
    if p <= 0.5 {
        (1.0, p)
    } else {
        (-1.0, 1.0 - p)
    }
}

fn quartic_estimate(p: f64) -> f64 {
    let (sign, p) = fold(p);
    let mut x = (2.0 * p).powf(0.4258865685331) - 1.0;
    if (0.004..0.499).contains(&p) {
        x += 0.026818732 * (7.101753784 * p + 2.73230839482953).sin();
    }
    x * sign
}

fn triweight_estimate(p: f64) -> f64 {
    let (sign, p) = fold(p);
    let x = (2.0 * p).powf(0.3400218741872791) - 1.0;
    x * sign
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = StatsError;

    /// Parses a kernel name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        [
            Kernel::Normal,
            Kernel::Gauss,
            Kernel::Logistic,
            Kernel::Sigmoid,
            Kernel::Rectangular,
            Kernel::Uniform,
            Kernel::Triangular,
            Kernel::Parabolic,
            Kernel::Epanechnikov,
            Kernel::Quartic,
            Kernel::Biweight,
            Kernel::Triweight,
            Kernel::Cosine,
        ]
        .into_iter()
        .find(|k| k.name().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| StatsError::invalid(format!("unknown kernel: {s:?}")))
    }
}

// ============================================================================
// Density estimate
// ============================================================================

/// A kernel density estimate over a fixed sample, bandwidth and kernel.
///
/// The sample is stored sorted so that bounded kernels only visit the
/// observations inside `[x − h, x + h]`.
///
/// # Examples
/// ```
/// use u_stats::kde::{Kernel, KernelDensity};
///
/// let kd = KernelDensity::new(&[1.0, 2.0, 2.5, 4.0], 0.8, Kernel::Epanechnikov).unwrap();
/// assert_eq!(kd.cdf(-10.0), 0.0);
/// assert_eq!(kd.cdf(10.0), 1.0);
/// assert!(kd.pdf(2.2) > kd.pdf(3.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    sample: Vec<f64>,
    h: f64,
    kernel: Kernel,
}

impl KernelDensity {
    /// # Errors
    /// [`StatsError::InvalidParameters`] if the sample is empty or holds a
    /// non-finite value, or if `h` is not a positive finite number.
    pub fn new(sample: &[f64], h: f64, kernel: Kernel) -> Result<Self> {
        if sample.is_empty() {
            return Err(StatsError::invalid("kde requires a non-empty sample"));
        }
        if sample.iter().any(|x| !x.is_finite()) {
            return Err(StatsError::invalid("kde sample values must be finite"));
        }
        if !(h > 0.0 && h.is_finite()) {
            return Err(StatsError::invalid(format!(
                "bandwidth must be positive and finite, got h={h}"
            )));
        }
        let mut sorted = sample.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);
        Ok(Self {
            sample: sorted,
            h,
            kernel,
        })
    }

    /// Sorted copy of the sample.
    pub fn sample(&self) -> &[f64] {
        &self.sample
    }

    pub fn bandwidth(&self) -> f64 {
        self.h
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Indices `[i, j)` of the observations within `h` of `x`.
    fn window(&self, x: f64) -> (usize, usize) {
        let i = self.sample.partition_point(|&s| s < x - self.h);
        let j = self.sample.partition_point(|&s| s <= x + self.h);
        (i, j)
    }

    /// Estimated density at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        let n = self.sample.len() as f64;
        let k = self.kernel;
        let near = match k.support() {
            Some(_) => {
                let (i, j) = self.window(x);
                &self.sample[i..j]
            }
            None => &self.sample[..],
        };
        let sum: f64 = near.iter().map(|&s| k.density((x - s) / self.h)).sum();
        sum / (n * self.h)
    }

    /// Estimated cumulative probability at `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        let n = self.sample.len() as f64;
        let k = self.kernel;
        let (below, near) = match k.support() {
            // every observation left of the window contributes a full unit
            Some(_) => {
                let (i, j) = self.window(x);
                (i as f64, &self.sample[i..j])
            }
            None => (0.0, &self.sample[..]),
        };
        let sum: f64 = near.iter().map(|&s| k.cumulative((x - s) / self.h)).sum();
        (below + sum) / n
    }

    /// Draws one value from the estimate using a caller-owned generator.
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> f64 {
        let i = rng.random_range(0..self.sample.len());
        self.sample[i] + self.h * self.kernel.deviate(rng)
    }

    /// An endless stream of draws from the estimate. `Some(seed)` makes
    /// the stream reproducible.
    pub fn sampler(&self, seed: Option<u64>) -> KdeSampler {
        self.clone().into_sampler(seed)
    }

    pub fn into_sampler(self, seed: Option<u64>) -> KdeSampler {
        KdeSampler {
            density: self,
            rng: random::rng_from_seed(seed),
        }
    }
}

/// Random draws from a [`KernelDensity`]; never exhausts.
///
/// # Examples
/// ```
/// use u_stats::kde::{Kernel, KernelDensity};
///
/// let kd = KernelDensity::new(&[1.0, 5.0], 0.5, Kernel::Rectangular).unwrap();
/// let draws: Vec<f64> = kd.sampler(Some(3)).take(100).collect();
/// assert!(draws.iter().all(|&x| (0.5..=1.5).contains(&x) || (4.5..=5.5).contains(&x)));
/// ```
#[derive(Debug, Clone)]
pub struct KdeSampler {
    density: KernelDensity,
    rng: StatsRng,
}

impl KdeSampler {
    pub fn draw(&mut self) -> f64 {
        self.density.sample_with(&mut self.rng)
    }
}

impl Iterator for KdeSampler {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.draw())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

// ============================================================================
// Functional interface
// ============================================================================

/// Builds a kernel density estimate and returns it as a function of `x`.
///
/// With `cumulative = true` the returned function is the estimated CDF.
///
/// # Errors
/// As [`KernelDensity::new`].
pub fn kde(
    sample: &[f64],
    h: f64,
    kernel: Kernel,
    cumulative: bool,
) -> Result<impl Fn(f64) -> f64> {
    let density = KernelDensity::new(sample, h, kernel)?;
    Ok(move |x| {
        if cumulative {
            density.cdf(x)
        } else {
            density.pdf(x)
        }
    })
}

/// Returns a generator of random draws from the kernel density estimate.
///
/// # Errors
/// As [`KernelDensity::new`].
///
/// # Examples
/// ```
/// use u_stats::kde::{kde_random, Kernel};
///
/// let data = [-2.1, -1.3, -0.4, 1.9, 5.1, 6.2];
/// let mut a = kde_random(&data, 1.5, Kernel::Normal, Some(8675309)).unwrap();
/// let mut b = kde_random(&data, 1.5, Kernel::Normal, Some(8675309)).unwrap();
/// for _ in 0..5 {
///     assert_eq!(a(), b());
/// }
/// ```
pub fn kde_random(
    sample: &[f64],
    h: f64,
    kernel: Kernel,
    seed: Option<u64>,
) -> Result<impl FnMut() -> f64> {
    let mut sampler = KernelDensity::new(sample, h, kernel)?.into_sampler(seed);
    Ok(move || sampler.draw())
}

// ============================================================================
// Tests
// ============================================================================
