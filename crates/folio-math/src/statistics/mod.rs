//! Descriptive statistics.
//!
//! Moments come from `statrs`; order statistics use linear interpolation
//! between closest ranks (rank `p/100 * (n - 1)`), the same convention as
//! NumPy's default `percentile`.

use crate::error::{MathError, MathResult};
use statrs::statistics::Statistics;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(values.iter().mean())
}

/// Population (divide-by-n) standard deviation.
pub fn population_std_dev(values: &[f64]) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if values.len() == 1 {
        return Ok(0.0);
    }
    Ok(values.iter().population_std_dev())
}

/// Returns a sorted copy of `values`, rejecting NaN and infinities.
pub fn sorted_finite(values: &[f64]) -> MathResult<Vec<f64>> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::non_finite("sample"));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Percentile of an ascending-sorted sample with linear interpolation.
///
/// `p` is in percent, `0.0..=100.0`.
///
/// # Example
///
/// ```rust
/// use folio_math::statistics::percentile_sorted;
///
/// let sorted = [90.0, 95.0, 100.0, 105.0, 110.0];
/// assert_eq!(percentile_sorted(&sorted, 50.0).unwrap(), 100.0);
/// assert!((percentile_sorted(&sorted, 5.0).unwrap() - 91.0).abs() < 1e-12);
/// ```
pub fn percentile_sorted(sorted: &[f64], p: f64) -> MathResult<f64> {
    if sorted.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(MathError::invalid_input(format!(
            "Percentile must be in [0, 100], got {}",
            p
        )));
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of an ascending-sorted sample.
pub fn median_sorted(sorted: &[f64]) -> MathResult<f64> {
    percentile_sorted(sorted, 50.0)
}
