//! Linear algebra utilities.
//!
//! This module provides the matrix operations needed for portfolio
//! risk calculations: sample moments of return panels, quadratic forms
//! and covariance sanity checks.

use crate::error::{MathError, MathResult};
use nalgebra::{Cholesky, DMatrix, DVector};

/// Relative pivot size below which a covariance matrix is treated as singular.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Computes the mean of every column of an observation matrix.
///
/// Rows are observations, columns are variables.
pub fn column_means(observations: &DMatrix<f64>) -> MathResult<DVector<f64>> {
    let rows = observations.nrows();
    if rows == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }

    Ok(DVector::from_iterator(
        observations.ncols(),
        observations.column_iter().map(|c| c.sum() / rows as f64),
    ))
}

/// Computes the sample covariance matrix of an observation matrix.
///
/// Rows are observations, columns are variables. Uses the unbiased
/// `n - 1` divisor. The result is exactly symmetric.
///
/// # Example
///
/// ```rust
/// use folio_math::linear_algebra::sample_covariance;
/// use nalgebra::DMatrix;
///
/// // Two perfectly anti-correlated variables
/// let obs = DMatrix::from_row_slice(3, 2, &[1.0, 3.0, 2.0, 2.0, 3.0, 1.0]);
/// let cov = sample_covariance(&obs).unwrap();
///
/// assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((cov[(0, 1)] + 1.0).abs() < 1e-12);
/// ```
pub fn sample_covariance(observations: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    let (rows, cols) = observations.shape();
    if rows < 2 {
        return Err(MathError::insufficient_data(2, rows));
    }
    if observations.iter().any(|x| !x.is_finite()) {
        return Err(MathError::non_finite("observation matrix"));
    }

    let means = column_means(observations)?;
    let centered = DMatrix::from_fn(rows, cols, |t, i| observations[(t, i)] - means[i]);

    let mut cov = centered.transpose() * &centered;
    cov /= (rows - 1) as f64;
    cov.fill_lower_triangle_with_upper_triangle();

    Ok(cov)
}

/// Evaluates `wᵀ · M · w`.
pub fn quadratic_form(matrix: &DMatrix<f64>, w: &DVector<f64>) -> MathResult<f64> {
    check_matrix_vector(matrix, w)?;
    Ok(w.dot(&(matrix * w)))
}

fn check_matrix_vector(matrix: &DMatrix<f64>, w: &DVector<f64>) -> MathResult<()> {
    if matrix.ncols() != w.len() {
        return Err(MathError::DimensionMismatch {
            rows1: matrix.nrows(),
            cols1: matrix.ncols(),
            rows2: w.len(),
            cols2: 1,
        });
    }
    Ok(())
}

/// Checks that a matrix is square, finite and symmetric.
///
/// Symmetry is checked entry-wise with tolerance `tol` relative to the
/// largest absolute entry, so the check is independent of the matrix's units.
pub fn ensure_symmetric(matrix: &DMatrix<f64>, tol: f64) -> MathResult<()> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(MathError::invalid_input(format!(
            "Matrix must be square, got {}x{}",
            n,
            matrix.ncols()
        )));
    }
    if matrix.iter().any(|x| !x.is_finite()) {
        return Err(MathError::non_finite("matrix"));
    }

    let scale = matrix.amax();
    for i in 0..n {
        for j in i + 1..n {
            let a = matrix[(i, j)];
            let b = matrix[(j, i)];
            if (a - b).abs() > tol * scale {
                return Err(MathError::invalid_input(format!(
                    "Matrix is not symmetric at ({}, {}): {} vs {}",
                    i, j, a, b
                )));
            }
        }
    }
    Ok(())
}

/// Checks that a symmetric matrix is numerically positive definite.
///
/// Runs a Cholesky factorization and rejects the matrix if it fails or if
/// any squared pivot is smaller than [`SINGULARITY_TOLERANCE`] times the
/// largest diagonal entry.
pub fn ensure_positive_definite(matrix: &DMatrix<f64>) -> MathResult<()> {
    let n = matrix.nrows();
    if n == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }

    let max_diag = matrix.diagonal().iter().copied().fold(0.0_f64, f64::max);
    if max_diag <= 0.0 {
        return Err(MathError::singular("all variances are zero"));
    }

    let chol = Cholesky::new(matrix.clone())
        .ok_or_else(|| MathError::singular("Cholesky factorization failed"))?;

    let l = chol.l();
    for i in 0..n {
        let pivot = l[(i, i)] * l[(i, i)];
        if pivot < SINGULARITY_TOLERANCE * max_diag {
            log::debug!("Cholesky pivot {} is {:.3e} (max diagonal {:.3e})", i, pivot, max_diag);
            return Err(MathError::singular(format!(
                "pivot {} is {:.3e} relative to diagonal",
                i,
                pivot / max_diag
            )));
        }
    }
    Ok(())
}
