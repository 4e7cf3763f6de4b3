//! Precision rounding.
//!
//! Rounded results are always computed as `round(value, precision)` applied
//! to the full-precision result; no intermediate state is ever rounded.

/// Rounds `value` to `precision` decimal places (half away from zero).
///
/// Non-finite values pass through unchanged.
///
/// # Examples
/// ```
/// use u_stats::math::round;
/// assert_eq!(round(0.120985, 3), 0.121);
/// assert_eq!(round(0.120985, 2), 0.12);
/// assert_eq!(round(-2.5, 0), -3.0);
/// ```
pub fn round(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        // Already finer than the requested precision can express.
        return value;
    }
    scaled.round() / scale
}

/// Extension trait attaching [`round`] to scalar results.
///
/// Works on bare `f64`, on `Option<f64>` and `Result<f64, E>` (rounding only
/// the success value), and element-wise on `Vec<f64>`.
///
/// # Examples
/// ```
/// use u_stats::math::Round;
/// use u_stats::distributions::NormalDist;
///
/// let nd = NormalDist::new(10.0, 2.0).unwrap();
/// assert_eq!(nd.pdf(12.0).round_to(3), 0.121);
/// ```
pub trait Round {
    fn round_to(self, precision: u32) -> Self;
}

impl Round for f64 {
    fn round_to(self, precision: u32) -> Self {
        round(self, precision)
    }
}

impl Round for Option<f64> {
    fn round_to(self, precision: u32) -> Self {
        self.map(|v| round(v, precision))
    }
}

impl<E> Round for Result<f64, E> {
    fn round_to(self, precision: u32) -> Self {
        self.map(|v| round(v, precision))
    }
}

impl Round for Vec<f64> {
    fn round_to(self, precision: u32) -> Self {
        self.into_iter().map(|v| round(v, precision)).collect()
    }
}

impl<E> Round for Result<Vec<f64>, E> {
    fn round_to(self, precision: u32) -> Self {
        self.map(|v| v.round_to(precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_basic() {
        assert_eq!(round(2.71666666, 5), 2.71667);
        assert_eq!(round(0.5076087, 5), 0.50761);
        assert_eq!(round(1.0, 0), 1.0);
        assert_eq!(round(1234.5678, 0), 1235.0);
    }

    #[test]
    fn test_round_non_finite() {
        assert!(round(f64::NAN, 3).is_nan());
        assert_eq!(round(f64::INFINITY, 3), f64::INFINITY);
        assert_eq!(round(f64::NEG_INFINITY, 3), f64::NEG_INFINITY);
    }

    #[test]
    fn test_round_huge_precision_is_identity() {
        assert_eq!(round(1e300, 20), 1e300);
    }

    #[test]
    fn test_round_trait_wrappers() {
        assert_eq!(Some(0.123456).round_to(2), Some(0.12));
        assert_eq!(None::<f64>.round_to(2), None);

        let ok: Result<f64, ()> = Ok(3.14159);
        assert_eq!(ok.round_to(2), Ok(3.14));
        let err: Result<f64, &str> = Err("boom");
        assert_eq!(err.round_to(2), Err("boom"));

        assert_eq!(vec![1.234, 5.678].round_to(1), vec![1.2, 5.7]);
    }
}
