//! Descriptive statistics with numerical stability guarantees.
//!
//! Batch functions take a slice and return `None` for empty or invalid
//! input (NaN, and for most functions ±Inf). [`StreamingStat`] computes the
//! same moments online with O(1) memory and reports failures through
//! [`StatsError`].
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation for O(ε) error independent of n.
//! - **Variance/StdDev**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Quantile**: R-7 linear interpolation (default in R, NumPy, Excel).
//!   Reference: Hyndman & Fan (1996), "Sample Quantiles in Statistical
//!   Packages", *The American Statistician* 50(4).
//! - **Higher moments (streaming)**: Terriberry's extension of Welford's
//!   update to the third and fourth central moments.

use std::collections::HashMap;

use crate::error::{Result, StatsError};

// ---------------------------------------------------------------------------
// Central tendency
// ---------------------------------------------------------------------------

/// Computes the arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use u_stats::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Geometric mean `exp(mean(ln xᵢ))`.
///
/// # Returns
/// - `None` if `data` is empty, or any value is non-finite or `<= 0`.
///
/// # Examples
/// ```
/// use u_stats::stats::geometric_mean;
/// let g = geometric_mean(&[54.0, 24.0, 36.0]).unwrap();
/// assert!((g - 36.0).abs() < 1e-12);
/// ```
pub fn geometric_mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|&x| !x.is_finite() || x <= 0.0) {
        return None;
    }
    let logs: Vec<f64> = data.iter().map(|x| x.ln()).collect();
    Some((kahan_sum(&logs) / data.len() as f64).exp())
}

/// Harmonic mean `n / Σ(1/xᵢ)`.
///
/// A zero anywhere in the data makes the harmonic mean zero.
///
/// # Returns
/// - `None` if `data` is empty, or any value is negative or non-finite.
///
/// # Examples
/// ```
/// use u_stats::stats::harmonic_mean;
/// let h = harmonic_mean(&[40.0, 60.0]).unwrap();
/// assert!((h - 48.0).abs() < 1e-12);
/// ```
pub fn harmonic_mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|&x| !x.is_finite() || x < 0.0) {
        return None;
    }
    if data.iter().any(|&x| x == 0.0) {
        return Some(0.0);
    }
    let reciprocals: Vec<f64> = data.iter().map(|x| 1.0 / x).collect();
    Some(data.len() as f64 / kahan_sum(&reciprocals))
}

/// Computes the median of `data` without mutating the input.
///
/// Returns the middle element, or the average of the two middle elements
/// for even-length data.
///
/// # Complexity
/// Time: O(n log n), Space: O(n)
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(data)?;
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Low median: the smaller of the two middle values for even-length data.
///
/// Always returns a member of the data.
pub fn median_low(data: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(data)?;
    Some(sorted[(sorted.len() - 1) / 2])
}

/// High median: the larger of the two middle values for even-length data.
///
/// Always returns a member of the data.
pub fn median_high(data: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(data)?;
    Some(sorted[sorted.len() / 2])
}

/// Most common value. Ties resolve to the value seen first.
///
/// `-0.0` and `0.0` count as the same value.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::mode;
/// assert_eq!(mode(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 4.0]), Some(3.0));
/// assert_eq!(mode(&[2.0, 1.0, 1.0, 2.0]), Some(2.0));
/// ```
pub fn mode(data: &[f64]) -> Option<f64> {
    multimode(data)?.first().copied()
}

/// All values sharing the highest frequency, in order of first appearance.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::multimode;
/// let m = multimode(&[3.0, 1.0, 3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(m, vec![3.0, 1.0]);
/// ```
pub fn multimode(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    // key -> (count, first index)
    let mut counts: HashMap<u64, (usize, usize)> = HashMap::new();
    for (i, &x) in data.iter().enumerate() {
        let entry = counts.entry(value_key(x)).or_insert((0, i));
        entry.0 += 1;
    }
    let top = counts.values().map(|&(c, _)| c).max()?;
    let mut firsts: Vec<usize> = counts
        .values()
        .filter(|&&(c, _)| c == top)
        .map(|&(_, first)| first)
        .collect();
    firsts.sort_unstable();
    Some(firsts.into_iter().map(|i| data[i]).collect())
}

// ---------------------------------------------------------------------------
// Spread
// ---------------------------------------------------------------------------

/// Computes the sample variance using Welford's online algorithm.
///
/// Returns the **sample** (unbiased) variance with Bessel's correction
/// (denominator `n − 1`).
///
/// # Returns
/// - `None` if `data.len() < 2` or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stats::stats::variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !all_finite(data) {
        return None;
    }
    data.iter().copied().collect::<StreamingStat>().variance().ok()
}

/// Computes the population variance (denominator `n`).
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stats::stats::pvariance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((pvariance(&v).unwrap() - 4.0).abs() < 1e-10);
/// ```
pub fn pvariance(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    data.iter().copied().collect::<StreamingStat>().pvariance().ok()
}

/// Computes the sample standard deviation, `sqrt(variance(data))`.
///
/// # Examples
/// ```
/// use u_stats::stats::stdev;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// let sd = stdev(&v).unwrap();
/// assert!((sd - 2.138089935299395).abs() < 1e-10);
/// ```
pub fn stdev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Computes the population standard deviation, `sqrt(pvariance(data))`.
pub fn pstdev(data: &[f64]) -> Option<f64> {
    pvariance(data).map(f64::sqrt)
}

/// Returns the minimum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::min;
/// assert_eq!(min(&[3.0, 1.0, 4.0, 1.0, 5.0]), Some(1.0));
/// ```
pub fn min(data: &[f64]) -> Option<f64> {
    extremum(data, f64::min)
}

/// Returns the maximum value in the slice.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
pub fn max(data: &[f64]) -> Option<f64> {
    extremum(data, f64::max)
}

fn extremum(data: &[f64], pick: fn(f64, f64) -> f64) -> Option<f64> {
    let (&first, rest) = data.split_first()?;
    if data.iter().any(|x| x.is_nan()) {
        return None;
    }
    Some(rest.iter().fold(first, |acc, &x| pick(acc, x)))
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// Computes the `p`-th quantile using the R-7 linear interpolation method.
///
/// # Algorithm
/// For sorted data `x[0..n]` and quantile `p ∈ [0, 1]`:
/// 1. Compute `h = (n − 1) × p`
/// 2. Let `j = ⌊h⌋` and `g = h − j`
/// 3. Return `(1 − g) × x[j] + g × x[j+1]`
///
/// # Returns
/// - `None` if `data` is empty, `p` is outside `[0, 1]`, or data contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::quantile;
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(quantile(&data, 0.0), Some(1.0));
/// assert_eq!(quantile(&data, 1.0), Some(5.0));
/// assert_eq!(quantile(&data, 0.5), Some(3.0));
/// ```
pub fn quantile(data: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    quantile_sorted(&sorted_copy(data)?, p)
}

/// Computes the `p`-th quantile on **pre-sorted** data (R-7 method).
///
/// The caller must guarantee that `sorted_data` is sorted in
/// non-decreasing order.
///
/// # Returns
/// - `None` if `sorted_data` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted_data: &[f64], p: f64) -> Option<f64> {
    let last = sorted_data.len().checked_sub(1)?;
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = last as f64 * p;
    let lo = (h.floor() as usize).min(last);
    let x = sorted_data[lo];
    Some(match sorted_data.get(lo + 1) {
        Some(&next) => {
            let frac = h - lo as f64;
            (1.0 - frac) * x + frac * next
        }
        None => x,
    })
}

/// Interpolation rule for [`quantiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantileMethod {
    /// Treats the data as a sample from a larger population; positions use
    /// `m = n + 1` and may fall outside the observed range. (R type 6)
    #[default]
    Exclusive,
    /// Treats the data as the whole population; the minimum and maximum
    /// are the 0th and 100th percentiles. (R type 7)
    Inclusive,
}

/// Divides `data` into `n` continuous intervals of equal probability and
/// returns the `n − 1` cut points.
///
/// With a single data point every cut point equals that point.
///
/// # Returns
/// - `None` if `n < 1`, `data` is empty, or contains NaN.
///
/// # Examples
/// ```
/// use u_stats::stats::{quantiles, QuantileMethod};
/// let data = [105.0, 129.0, 87.0, 86.0, 111.0, 111.0, 89.0, 81.0, 108.0, 92.0,
///             110.0, 100.0, 75.0, 105.0, 103.0, 109.0, 76.0, 119.0, 99.0, 91.0];
/// let q = quantiles(&data, 4, QuantileMethod::Exclusive).unwrap();
/// assert_eq!(q, vec![89.25, 102.0, 109.75]);
/// ```
pub fn quantiles(data: &[f64], n: usize, method: QuantileMethod) -> Option<Vec<f64>> {
    if n < 1 {
        return None;
    }
    let sorted = sorted_copy(data)?;
    let ld = sorted.len();
    if ld == 1 {
        return Some(vec![sorted[0]; n - 1]);
    }
    let nf = n as f64;
    let cuts = match method {
        QuantileMethod::Inclusive => {
            let m = ld - 1;
            (1..n)
                .map(|i| {
                    let j = i * m / n;
                    let delta = (i * m - j * n) as f64;
                    (sorted[j] * (nf - delta) + sorted[j + 1] * delta) / nf
                })
                .collect()
        }
        QuantileMethod::Exclusive => {
            let m = ld + 1;
            (1..n)
                .map(|i| {
                    let j = (i * m / n).clamp(1, ld - 1);
                    let delta = (i * m) as f64 - (j * n) as f64;
                    (sorted[j - 1] * (nf - delta) + sorted[j] * delta) / nf
                })
                .collect()
        }
    };
    Some(cuts)
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Computes Fisher's adjusted sample skewness (G₁) with bias correction.
///
/// # Formula
/// ```text
/// G₁ = [√(n(n−1)) / (n−2)] × (m₃ / m₂^{3/2})
/// ```
/// where `m₂`, `m₃` are the biased second and third central moments.
///
/// This matches Excel `SKEW()` and `scipy.stats.skew(bias=False)`.
///
/// Reference: Joanes & Gill (1998), "Comparing measures of sample skewness
/// and kurtosis", *The Statistician* 47(1), pp. 183–189.
///
/// # Returns
/// - `None` if `data.len() < 3`, data contains NaN/Inf, or variance is zero.
///
/// # Examples
/// ```
/// use u_stats::stats::skewness;
/// let sym = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!(skewness(&sym).unwrap().abs() < 1e-14);
/// ```
pub fn skewness(data: &[f64]) -> Option<f64> {
    let [n, s2, s3, _] = central_sums(data, 3)?;
    Some(adjusted_skewness(n, population_skewness(n, s2, s3)))
}

/// Computes Fisher's excess kurtosis (G₂) with bias correction.
///
/// # Formula
/// ```text
/// g₂ = n·Σ(xᵢ−x̄)⁴ / (Σ(xᵢ−x̄)²)² − 3
/// G₂ = (n−1) / ((n−2)(n−3)) × ((n+1)·g₂ + 6)
/// ```
///
/// This matches Excel `KURT()` and `scipy.stats.kurtosis(bias=False)`.
///
/// # Returns
/// - `None` if `data.len() < 4`, data contains NaN/Inf, or variance is zero.
pub fn kurtosis(data: &[f64]) -> Option<f64> {
    let [n, s2, _, s4] = central_sums(data, 4)?;
    Some(adjusted_excess_kurtosis(n, population_excess_kurtosis(n, s2, s4)))
}

/// `[n, S₂, S₃, S₄]`: the count and the sums of squared, cubed and
/// fourth-power deviations from the mean.
///
/// `None` below `min_len` values, on non-finite data, or when `S₂ == 0`.
fn central_sums(data: &[f64], min_len: usize) -> Option<[f64; 4]> {
    if data.len() < min_len || !all_finite(data) {
        return None;
    }
    let n = data.len() as f64;
    let center = kahan_sum(data) / n;
    let [s2, s3, s4] = data.iter().fold([0.0; 3], |[s2, s3, s4], &x| {
        let d = x - center;
        let d2 = d * d;
        [s2 + d2, s3 + d2 * d, s4 + d2 * d2]
    });
    (s2 != 0.0).then_some([n, s2, s3, s4])
}

/// g₁ = √n · S₃ / S₂^{3/2}.
fn population_skewness(n: f64, s2: f64, s3: f64) -> f64 {
    n.sqrt() * s3 / s2.powf(1.5)
}

/// g₂ = n · S₄ / S₂² − 3.
fn population_excess_kurtosis(n: f64, s2: f64, s4: f64) -> f64 {
    n * s4 / (s2 * s2) - 3.0
}

/// G₁ = √(n(n−1)) / (n−2) · g₁.
fn adjusted_skewness(n: f64, g1: f64) -> f64 {
    (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
}

/// G₂ = (n−1) / ((n−2)(n−3)) · ((n+1)·g₂ + 6).
fn adjusted_excess_kurtosis(n: f64, g2: f64) -> f64 {
    (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
}

// ---------------------------------------------------------------------------
// Bivariate
// ---------------------------------------------------------------------------

/// Computes the sample covariance between two datasets.
///
/// # Formula
/// ```text
/// Cov(X, Y) = Σ(xᵢ − x̄)(yᵢ − ȳ) / (n − 1)
/// ```
///
/// # Returns
/// - `None` if `x.len() != y.len()`, `n < 2`, or data contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_stats::stats::covariance;
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// assert!((covariance(&x, &y).unwrap() - 5.0).abs() < 1e-14);
/// ```
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 || !all_finite(x) || !all_finite(y) {
        return None;
    }
    let nf = n as f64;
    let mean_x = kahan_sum(x) / nf;
    let mean_y = kahan_sum(y) / nf;
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    Some(sum / (nf - 1.0))
}

/// Pearson correlation coefficient.
///
/// # Returns
/// - `None` under the same conditions as [`covariance`], or when either
///   input has zero variance.
///
/// # Examples
/// ```
/// use u_stats::stats::correlation;
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [10.0, 8.0, 6.0, 4.0];
/// assert!((correlation(&x, &y).unwrap() + 1.0).abs() < 1e-12);
/// ```
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let sx = stdev(x)?;
    let sy = stdev(y)?;
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Kahan compensated summation
// ---------------------------------------------------------------------------

/// Neumaier compensated summation for O(ε) error independent of `n`.
///
/// Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
/// zur Summation endlicher Summen", *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let (sum, lost) = data.iter().fold((0.0_f64, 0.0_f64), |(sum, lost), &x| {
        let t = sum + x;
        let err = if sum.abs() >= x.abs() {
            (sum - t) + x
        } else {
            (x - t) + sum
        };
        (t, lost + err)
    });
    sum + lost
}

fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|x| x.is_finite())
}

/// Sorted copy of `data`, or `None` when empty or NaN is present.
pub(crate) fn sorted_copy(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() || data.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted)
}

/// Hash key identifying equal floats (`-0.0` folds onto `0.0`).
pub(crate) fn value_key(x: f64) -> u64 {
    if x == 0.0 {
        0.0_f64.to_bits()
    } else {
        x.to_bits()
    }
}

// ---------------------------------------------------------------------------
// Streaming accumulator
// ---------------------------------------------------------------------------

/// Single-pass accumulator for count, sum, extrema, mean, variance,
/// skewness and kurtosis.
///
/// Uses O(1) memory: no observation is retained. The central moment sums
/// M₂, M₃, M₄ are updated incrementally and never recomputed from data.
///
/// # Algorithm
/// For each new value with `n₁` previous observations and `n = n₁ + 1`:
/// ```text
/// δ = x − μ,  δₙ = δ / n,  t = δ · δₙ · n₁
/// M₄ += t·δₙ²·(n² − 3n + 3) + 6·δₙ²·M₂ − 4·δₙ·M₃
/// M₃ += t·δₙ·(n − 2) − 3·δₙ·M₂
/// M₂ += t
/// μ  += δₙ
/// ```
/// Every right-hand side reads the moments as they were before `x`.
///
/// References:
/// - Welford (1962), *Technometrics* 4(3), pp. 419–420.
/// - Terriberry (2007), "Computing Higher-Order Moments Online".
/// - Pébay (2008), Sandia Report SAND2008-6212 (parallel merge).
///
/// # Examples
/// ```
/// use u_stats::stats::StreamingStat;
/// let mut acc = StreamingStat::new();
/// acc.add(2.0).add(4.0).add(4.0).add(4.0).add(5.0).add(5.0).add(7.0).add(9.0);
/// assert_eq!(acc.mean().unwrap(), 5.0);
/// assert_eq!(acc.pvariance().unwrap(), 4.0);
/// assert!((acc.variance().unwrap() - 4.571428571428571).abs() < 1e-12);
/// assert_eq!(acc.min().unwrap(), 2.0);
/// assert_eq!(acc.max().unwrap(), 9.0);
/// ```
///
/// Non-finite inputs are accepted and propagate into the results.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamingStat {
    count: u64,
    mean_acc: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    sum: f64,
    min: f64,
    max: f64,
}

impl StreamingStat {
    /// Creates a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean_acc: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Feeds a new value into the accumulator and returns it for chaining.
    ///
    /// The first value only initialises the mean; every moment stays zero.
    /// This avoids intermediate overflow when `δ²` exceeds `f64::MAX`.
    pub fn add(&mut self, value: f64) -> &mut Self {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        if self.count == 1 {
            self.mean_acc = value;
            return self;
        }

        let n = self.count as f64;
        let delta = value - self.mean_acc;
        let dn = delta / n;
        let dn2 = dn * dn;
        let t = delta * dn * (n - 1.0);
        let (m2, m3) = (self.m2, self.m3);

        self.mean_acc += dn;
        self.m2 = m2 + t;
        self.m3 = m3 + dn * (t * (n - 2.0) - 3.0 * m2);
        self.m4 += dn2 * (t * (n * n - 3.0 * n + 3.0) + 6.0 * m2) - 4.0 * dn * m3;
        self
    }

    /// Number of values added so far (never fails).
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of values added; fails when empty.
    pub fn count(&self) -> Result<u64> {
        self.require(1)?;
        Ok(self.count)
    }

    /// Raw sum of every value added.
    pub fn sum(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.sum)
    }

    pub fn min(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.min)
    }

    pub fn max(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.max)
    }

    /// `max − min`.
    pub fn range(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.max - self.min)
    }

    /// Running arithmetic mean.
    pub fn mean(&self) -> Result<f64> {
        self.require(1)?;
        Ok(self.mean_acc)
    }

    /// Sample variance (n − 1 denominator); needs at least 2 values.
    pub fn variance(&self) -> Result<f64> {
        let n = self.require(2)?;
        Ok(self.m2 / (n - 1.0))
    }

    /// Population variance (n denominator); needs at least 1 value.
    pub fn pvariance(&self) -> Result<f64> {
        let n = self.require(1)?;
        Ok(self.m2 / n)
    }

    /// Sample standard deviation.
    pub fn stdev(&self) -> Result<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Population standard deviation.
    pub fn pstdev(&self) -> Result<f64> {
        self.pvariance().map(f64::sqrt)
    }

    /// Fisher's adjusted sample skewness G₁ = √(n(n−1))/(n−2) · g₁.
    ///
    /// # Errors
    /// `InsufficientData` below 3 values, `ZeroVariance` when every value
    /// is identical.
    pub fn skewness(&self) -> Result<f64> {
        let g1 = self.pskewness()?;
        Ok(adjusted_skewness(self.count as f64, g1))
    }

    /// Population (biased) skewness g₁ = √n · M₃ / M₂^{3/2}.
    ///
    /// # Errors
    /// Same conditions as [`skewness`](Self::skewness).
    pub fn pskewness(&self) -> Result<f64> {
        let n = self.require(3)?;
        self.require_spread()?;
        Ok(population_skewness(n, self.m2, self.m3))
    }

    /// Fisher's unbiased excess kurtosis
    /// G₂ = (n−1)/((n−2)(n−3)) · ((n+1)·g₂ + 6).
    ///
    /// # Errors
    /// `InsufficientData` below 4 values, `ZeroVariance` when every value
    /// is identical.
    pub fn kurtosis(&self) -> Result<f64> {
        let g2 = self.pkurtosis()?;
        Ok(adjusted_excess_kurtosis(self.count as f64, g2))
    }

    /// Population (biased) excess kurtosis g₂ = n · M₄ / M₂² − 3.
    pub fn pkurtosis(&self) -> Result<f64> {
        let n = self.require(4)?;
        self.require_spread()?;
        Ok(population_excess_kurtosis(n, self.m2, self.m4))
    }

    /// Merges another accumulator into this one.
    ///
    /// Uses Chan's parallel algorithm extended to higher-order moments
    /// (Pébay 2008). The result matches feeding both streams through a
    /// single accumulator, up to rounding.
    pub fn merge(&mut self, other: &StreamingStat) -> &mut Self {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            *self = other.clone();
            return self;
        }
        let total = self.count + other.count;
        let n = total as f64;
        let (na, nb) = (self.count as f64, other.count as f64);
        let (wa, wb) = (na / n, nb / n);
        let pair = na * nb / n;
        let d = other.mean_acc - self.mean_acc;
        let d2 = d * d;

        let m4 = self.m4
            + other.m4
            + d2 * d2 * pair * (na * na - na * nb + nb * nb) / (n * n)
            + 6.0 * d2 * (wa * wa * other.m2 + wb * wb * self.m2)
            + 4.0 * d * (wa * other.m3 - wb * self.m3);
        let m3 = self.m3
            + other.m3
            + d2 * d * pair * (na - nb) / n
            + 3.0 * d * (wa * other.m2 - wb * self.m2);

        self.count = total;
        self.mean_acc += d * wb;
        self.m2 += other.m2 + d2 * pair;
        self.m3 = m3;
        self.m4 = m4;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self
    }

    /// Count as `f64`, or `InsufficientData` below `needed`.
    fn require(&self, needed: u64) -> Result<f64> {
        if self.count < needed {
            return Err(StatsError::InsufficientData {
                needed,
                found: self.count,
            });
        }
        Ok(self.count as f64)
    }

    fn require_spread(&self) -> Result<()> {
        if self.m2 == 0.0 {
            return Err(StatsError::ZeroVariance);
        }
        Ok(())
    }
}

impl Default for StreamingStat {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f64> for StreamingStat {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl FromIterator<f64> for StreamingStat {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = StreamingStat::new();
        acc.extend(iter);
        acc
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn feed(data: &[f64]) -> StreamingStat {
        data.iter().copied().collect()
    }

    // --- means ---

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_invalid() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), None);
        assert_eq!(mean(&[1.0, f64::INFINITY, 3.0]), None);
    }

    #[test]
    fn test_geometric_mean() {
        assert_relative_eq!(geometric_mean(&[2.0, 8.0]).unwrap(), 4.0, epsilon = 1e-12);
        assert_eq!(geometric_mean(&[]), None);
        assert_eq!(geometric_mean(&[1.0, 0.0]), None);
        assert_eq!(geometric_mean(&[1.0, -2.0]), None);
    }

    #[test]
    fn test_harmonic_mean() {
        assert_relative_eq!(harmonic_mean(&[2.5, 3.0, 10.0]).unwrap(), 3.6, epsilon = 1e-12);
        assert_eq!(harmonic_mean(&[4.0, 0.0]), Some(0.0));
        assert_eq!(harmonic_mean(&[4.0, -1.0]), None);
        assert_eq!(harmonic_mean(&[]), None);
    }

    // --- medians ---

    #[test]
    fn test_median_variants() {
        let even = [1.0, 3.0, 5.0, 7.0];
        assert_eq!(median(&even), Some(4.0));
        assert_eq!(median_low(&even), Some(3.0));
        assert_eq!(median_high(&even), Some(5.0));

        let odd = [5.0, 1.0, 3.0];
        assert_eq!(median(&odd), Some(3.0));
        assert_eq!(median_low(&odd), Some(3.0));
        assert_eq!(median_high(&odd), Some(3.0));
    }

    #[test]
    fn test_median_invalid() {
        assert_eq!(median(&[]), None);
        assert_eq!(median_low(&[]), None);
        assert_eq!(median_high(&[1.0, f64::NAN]), None);
    }

    // --- modes ---

    #[test]
    fn test_mode_first_wins_ties() {
        assert_eq!(mode(&[1.0, 2.0, 2.0, 1.0]), Some(1.0));
        assert_eq!(mode(&[7.0]), Some(7.0));
    }

    #[test]
    fn test_multimode() {
        assert_eq!(
            multimode(&[1.0, 1.0, 2.0, 2.0, 3.0]),
            Some(vec![1.0, 2.0])
        );
        assert_eq!(multimode(&[4.0, 5.0, 6.0]), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(multimode(&[]), None);
        assert_eq!(multimode(&[f64::NAN]), None);
    }

    #[test]
    fn test_mode_signed_zero() {
        assert_eq!(multimode(&[-0.0, 0.0, 1.0]).unwrap().len(), 1);
    }

    // --- spread ---

    #[test]
    fn test_variance_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(variance(&v).unwrap(), 4.571428571428571, epsilon = 1e-10);
        assert_relative_eq!(pvariance(&v).unwrap(), 4.0, epsilon = 1e-10);
        assert_relative_eq!(stdev(&v).unwrap(), 4.571428571428571_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(pstdev(&v).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_variance_edge_cases() {
        assert_eq!(variance(&[1.0]), None);
        assert_eq!(variance(&[]), None);
        assert_eq!(pvariance(&[]), None);
        assert_eq!(pvariance(&[3.0]), Some(0.0));
        assert!((variance(&[5.0; 100]).unwrap()).abs() < 1e-15);
    }

    #[test]
    fn test_variance_large_offset() {
        // Naive E[X²] − E[X]² would lose everything here.
        let data: Vec<f64> = (1..=5).map(|i| 1e9 + i as f64).collect();
        let var = variance(&data).unwrap();
        assert!((var - 2.5).abs() < 1e-5, "got {var}");
    }

    #[test]
    fn test_min_max() {
        let v = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert_eq!(min(&v), Some(1.0));
        assert_eq!(max(&v), Some(9.0));
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[1.0, f64::NAN]), None);
    }

    // --- quantiles ---

    #[test]
    fn test_quantile_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0];
        // h = 0.75 → 0.25·1 + 0.75·2
        assert!((quantile(&data, 0.25).unwrap() - 1.75).abs() < 1e-15);
        assert_eq!(quantile(&data, -0.1), None);
        assert_eq!(quantile(&data, 1.1), None);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[42.0], 0.5), Some(42.0));
    }

    #[test]
    fn test_quantiles_exclusive_deciles() {
        let data = [
            105.0, 129.0, 87.0, 86.0, 111.0, 111.0, 89.0, 81.0, 108.0, 92.0, 110.0, 100.0, 75.0,
            105.0, 103.0, 109.0, 76.0, 119.0, 99.0, 91.0, 103.0, 129.0, 106.0, 101.0, 84.0, 111.0,
            74.0, 87.0, 86.0, 103.0, 103.0, 106.0, 86.0, 111.0, 75.0, 87.0, 102.0, 121.0, 111.0,
            88.0, 89.0, 101.0, 106.0, 95.0, 103.0, 107.0, 101.0, 81.0, 109.0, 104.0,
        ];
        let q = quantiles(&data, 10, QuantileMethod::Exclusive).unwrap();
        let expected = [81.0, 86.2, 89.0, 99.4, 102.5, 103.6, 106.0, 109.8, 111.0];
        assert_eq!(q.len(), 9);
        for (a, b) in q.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_quantiles_inclusive_quartiles() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let q = quantiles(&data, 4, QuantileMethod::Inclusive).unwrap();
        assert_eq!(q, vec![2.0, 3.0, 4.0]);
        let q = quantiles(&data, 4, QuantileMethod::Exclusive).unwrap();
        assert_eq!(q, vec![1.5, 3.0, 4.5]);
    }

    #[test]
    fn test_quantiles_edge_cases() {
        assert_eq!(quantiles(&[1.0, 2.0], 0, QuantileMethod::Exclusive), None);
        assert_eq!(quantiles(&[], 4, QuantileMethod::Exclusive), None);
        assert_eq!(
            quantiles(&[3.0], 4, QuantileMethod::Inclusive),
            Some(vec![3.0, 3.0, 3.0])
        );
        assert_eq!(
            quantiles(&[1.0, 2.0], 1, QuantileMethod::Exclusive),
            Some(vec![])
        );
    }

    // --- skewness / kurtosis ---

    #[test]
    fn test_skewness_known_value() {
        // n=5, mean=3.6, m2=5.84, m3=12.672 → G1 ≈ 1.3388
        let s = skewness(&[1.0, 2.0, 3.0, 4.0, 8.0]).unwrap();
        assert!((s - 1.339).abs() < 0.01, "got {s}");
    }

    #[test]
    fn test_skewness_edge_cases() {
        assert_eq!(skewness(&[1.0, 2.0]), None);
        assert_eq!(skewness(&[5.0, 5.0, 5.0]), None);
        assert_eq!(skewness(&[1.0, f64::NAN, 3.0]), None);
    }

    #[test]
    fn test_kurtosis_signs() {
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!(kurtosis(&flat).unwrap() < 0.0);
        let heavy = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0];
        assert!(kurtosis(&heavy).unwrap() > 0.0);
        assert_eq!(kurtosis(&[1.0, 2.0, 3.0]), None);
        assert_eq!(kurtosis(&[5.0; 4]), None);
    }

    #[test]
    fn test_kurtosis_known_value() {
        // KURT(1..10) = −1.2
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((kurtosis(&data).unwrap() + 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_sorted_interpolates() {
        let sorted = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(8.0));
        assert_eq!(quantile_sorted(&[7.0], 0.3), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&sorted, 1.5), None);
    }

    // --- covariance / correlation ---

    #[test]
    fn test_covariance() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((covariance(&x, &y).unwrap() + 5.0).abs() < 1e-14);
        assert_eq!(covariance(&[1.0], &[2.0]), None);
        assert_eq!(covariance(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.1, 5.9, 8.2, 9.9];
        let r = correlation(&x, &y).unwrap();
        assert!(r > 0.99 && r <= 1.0);
        assert_eq!(correlation(&x, &[1.0; 5]), None);
    }

    // --- kahan_sum ---

    #[test]
    fn test_kahan_sum_precision() {
        let v = [1e16, 1.0, -1e16];
        assert!((kahan_sum(&v) - 1.0).abs() < 1e-10);
    }

    // --- StreamingStat ---

    #[test]
    fn test_streaming_empty_fails() {
        let acc = StreamingStat::new();
        let empty = Err(StatsError::InsufficientData { needed: 1, found: 0 });
        assert!(acc.is_empty());
        assert_eq!(acc.len(), 0);
        assert_eq!(acc.count(), Err(StatsError::InsufficientData { needed: 1, found: 0 }));
        assert_eq!(acc.sum(), empty);
        assert_eq!(acc.min(), empty);
        assert_eq!(acc.max(), empty);
        assert_eq!(acc.mean(), empty);
        assert_eq!(acc.pvariance(), empty);
    }

    #[test]
    fn test_streaming_single() {
        let mut acc = StreamingStat::new();
        acc.add(5.0);
        assert_eq!(acc.count(), Ok(1));
        assert_eq!(acc.mean(), Ok(5.0));
        assert_eq!(acc.sum(), Ok(5.0));
        assert_eq!(acc.pvariance(), Ok(0.0));
        assert_eq!(
            acc.variance(),
            Err(StatsError::InsufficientData { needed: 2, found: 1 })
        );
    }

    #[test]
    fn test_streaming_chaining_returns_same_accumulator() {
        let mut acc = StreamingStat::new();
        let n = acc.add(1.0).add(2.0).add(3.0).len();
        assert_eq!(n, 3);
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_streaming_matches_batch() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, 13.0, -1.5];
        let acc = feed(&data);
        assert_relative_eq!(acc.mean().unwrap(), mean(&data).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(acc.variance().unwrap(), variance(&data).unwrap(), epsilon = 1e-10);
        assert_relative_eq!(acc.pvariance().unwrap(), pvariance(&data).unwrap(), epsilon = 1e-10);
        assert_relative_eq!(acc.skewness().unwrap(), skewness(&data).unwrap(), epsilon = 1e-10);
        assert_relative_eq!(acc.kurtosis().unwrap(), kurtosis(&data).unwrap(), epsilon = 1e-10);
        assert_eq!(acc.sum().unwrap(), data.iter().sum::<f64>());
        assert_eq!(acc.min().unwrap(), -1.5);
        assert_eq!(acc.max().unwrap(), 13.0);
        assert_eq!(acc.range().unwrap(), 14.5);
    }

    #[test]
    fn test_streaming_population_shape() {
        // g1 = G1 · (n−2)/√(n(n−1)); g2 from G2 by inverting the correction.
        let data = [1.0, 2.0, 3.0, 4.0, 50.0];
        let acc = feed(&data);
        let n = 5.0_f64;
        let g1 = acc.skewness().unwrap() * (n - 2.0) / (n * (n - 1.0)).sqrt();
        assert_relative_eq!(acc.pskewness().unwrap(), g1, epsilon = 1e-12);

        let big_g2 = acc.kurtosis().unwrap();
        let g2 = (big_g2 * (n - 2.0) * (n - 3.0) / (n - 1.0) - 6.0) / (n + 1.0);
        assert_relative_eq!(acc.pkurtosis().unwrap(), g2, epsilon = 1e-10);
    }

    #[test]
    fn test_streaming_shape_thresholds() {
        let mut acc = StreamingStat::new();
        acc.add(1.0).add(2.0);
        assert_eq!(
            acc.skewness(),
            Err(StatsError::InsufficientData { needed: 3, found: 2 })
        );
        acc.add(3.0);
        assert!(acc.skewness().is_ok());
        assert_eq!(
            acc.kurtosis(),
            Err(StatsError::InsufficientData { needed: 4, found: 3 })
        );
        acc.add(4.0);
        assert!(acc.kurtosis().is_ok());
    }

    #[test]
    fn test_streaming_zero_variance_shape_fails() {
        let acc = feed(&[3.0; 6]);
        assert_eq!(acc.variance(), Ok(0.0));
        assert_eq!(acc.skewness(), Err(StatsError::ZeroVariance));
        assert_eq!(acc.pskewness(), Err(StatsError::ZeroVariance));
        assert_eq!(acc.kurtosis(), Err(StatsError::ZeroVariance));
        assert_eq!(acc.pkurtosis(), Err(StatsError::ZeroVariance));
    }

    #[test]
    fn test_streaming_merge() {
        let data_a = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0];
        let data_b = [2.0, 50.0, 4.0, 6.0, 8.0, 100.0];
        let all: Vec<f64> = data_a.iter().chain(data_b.iter()).copied().collect();

        let mut acc = feed(&data_a);
        acc.merge(&feed(&data_b));
        let sequential = feed(&all);

        assert_eq!(acc.len(), 12);
        assert_relative_eq!(acc.mean().unwrap(), sequential.mean().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(acc.variance().unwrap(), sequential.variance().unwrap(), epsilon = 1e-9);
        assert_relative_eq!(acc.skewness().unwrap(), sequential.skewness().unwrap(), epsilon = 1e-8);
        assert_relative_eq!(acc.kurtosis().unwrap(), sequential.kurtosis().unwrap(), epsilon = 1e-6);
        assert_eq!(acc.min().unwrap(), 1.0);
        assert_eq!(acc.max().unwrap(), 100.0);
        assert_eq!(acc.sum().unwrap(), all.iter().sum::<f64>());
    }

    #[test]
    fn test_streaming_merge_with_empty() {
        let mut acc = feed(&[1.0, 2.0]);
        acc.merge(&StreamingStat::new());
        assert_eq!(acc.len(), 2);

        let mut empty = StreamingStat::new();
        empty.merge(&acc);
        assert_eq!(empty, acc);
    }

    #[test]
    fn test_streaming_huge_first_value() {
        let mut acc = StreamingStat::new();
        acc.add(1e200);
        assert_eq!(acc.mean(), Ok(1e200));
        assert_eq!(acc.pvariance(), Ok(0.0));
    }
}
