//! Euclidean projections used by the projected-gradient solver.

use crate::error::{MathError, MathResult};

/// Projects `v` onto `{x : sum(x) = total, x >= 0}`.
///
/// Uses the sort-based threshold algorithm: find the largest `k` such that
/// the `k` biggest entries stay positive after a common shift, then clip.
///
/// # Example
///
/// ```rust
/// use folio_math::optimization::project_onto_simplex;
///
/// let x = project_onto_simplex(&[0.8, 0.6, -0.2], 1.0).unwrap();
/// assert!((x[0] - 0.6).abs() < 1e-12);
/// assert!((x[1] - 0.4).abs() < 1e-12);
/// assert_eq!(x[2], 0.0);
/// ```
pub fn project_onto_simplex(v: &[f64], total: f64) -> MathResult<Vec<f64>> {
    if v.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if !(total.is_finite() && total > 0.0) {
        return Err(MathError::invalid_input(format!(
            "Simplex total must be positive, got {}",
            total
        )));
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(MathError::non_finite("projection input"));
    }

    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (k, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - total) / (k + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    Ok(v.iter().map(|&x| (x - theta).max(0.0)).collect())
}

/// Projects `v` onto `{x : x_i >= floor}` by clipping each coordinate.
pub fn project_onto_lower_bound(v: &[f64], floor: f64) -> MathResult<Vec<f64>> {
    if v.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if !floor.is_finite() {
        return Err(MathError::non_finite("lower bound"));
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(MathError::non_finite("projection input"));
    }
    Ok(v.iter().map(|&x| x.max(floor)).collect())
}
