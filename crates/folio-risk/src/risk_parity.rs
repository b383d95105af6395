//! Risk parity (equal risk contribution) optimization.
//!
//! Finds long-only, fully invested weights for which every asset contributes
//! the same share of portfolio volatility:
//!
//! ```text
//! sigma(w) = sqrt(w' C w)
//! RC_i(w)  = w_i (C w)_i / sigma(w)
//! f(w)     = sum_i (RC_i(w) - sigma(w) / n)^2
//! ```
//!
//! `f` is not convex: with negatively correlated assets a vertex of the
//! simplex can be a local minimum. The search therefore runs in two stages,
//! both with the spectral projected gradient solver from `folio-math`:
//!
//! 1. The strictly convex program `min 0.5 z'Rz - (1/n) sum ln z_i` over
//!    `z > 0`, on the correlation matrix `R`. Its unique minimizer satisfies
//!    `z_i (Rz)_i = 1/n`, the equal-contribution condition. A few Newton
//!    steps on that condition finish what the line search cannot resolve
//!    in floating point.
//! 2. `f` itself over the probability simplex, from the normalized stage one
//!    point, with the analytic gradient below.
//!
//! A result is accepted only if its contributions are equal to within
//! [`PARITY_TOLERANCE`] of portfolio volatility.

use nalgebra::{Cholesky, DMatrix, DVector};

use folio_math::linear_algebra::{ensure_positive_definite, ensure_symmetric};
use folio_math::optimization::{
    project_onto_lower_bound, project_onto_simplex, spectral_projected_gradient,
    OptimizationConfig,
};
use folio_math::{MathError, MathResult};

use crate::config::EngineConfig;
use crate::error::{RiskError, RiskResult};

/// Solver name reported with results.
pub const METHOD: &str = "SPG";

/// Relative tolerance for covariance symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Volatility (of the unit-scaled covariance) treated as zero.
const VOLATILITY_FLOOR: f64 = 1e-12;

/// Largest accepted `max_i |RC_i - sigma / n| / sigma`.
pub const PARITY_TOLERANCE: f64 = 1e-8;

/// Lower bound on the convex-stage variables.
const BARRIER_FLOOR: f64 = 1e-12;

/// Newton steps allowed after the convex-stage search.
const NEWTON_STEPS: u32 = 20;

/// Optimized risk parity allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParityResult {
    /// Weights, non-negative and summing to 1.
    pub weights: Vec<f64>,
    /// Each asset's contribution to portfolio volatility.
    pub risk_contributions: Vec<f64>,
    /// Portfolio volatility at `weights`.
    pub portfolio_volatility: f64,
    /// Solver iterations used.
    pub iterations: u32,
    /// Final objective value on the unit-scaled covariance.
    pub objective: f64,
    /// Solver name.
    pub method: &'static str,
}

/// Risk contributions and volatility of a weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBreakdown {
    /// `sqrt(w' C w)`
    pub volatility: f64,
    /// `C w`
    pub marginal: DVector<f64>,
    /// `w_i (C w)_i / sigma`
    pub contributions: DVector<f64>,
}

impl RiskBreakdown {
    /// Decomposes portfolio volatility into per-asset contributions.
    ///
    /// Fails with [`MathError::DivisionByZero`] when the volatility is zero.
    pub fn compute(covariance: &DMatrix<f64>, weights: &DVector<f64>) -> MathResult<Self> {
        if covariance.ncols() != weights.len() {
            return Err(MathError::DimensionMismatch {
                rows1: covariance.nrows(),
                cols1: covariance.ncols(),
                rows2: weights.len(),
                cols2: 1,
            });
        }

        let marginal = covariance * weights;
        let variance = weights.dot(&marginal);
        if !variance.is_finite() {
            return Err(MathError::non_finite("portfolio variance"));
        }
        if variance <= 0.0 {
            return Err(MathError::DivisionByZero { value: variance });
        }

        let volatility = variance.sqrt();
        let contributions = weights.component_mul(&marginal) / volatility;
        Ok(Self {
            volatility,
            marginal,
            contributions,
        })
    }
}

/// Risk parity optimizer.
#[derive(Debug, Clone, Default)]
pub struct RiskParityOptimizer {
    config: EngineConfig,
}

impl RiskParityOptimizer {
    /// Creates an optimizer with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes risk parity weights for `covariance`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the matrix is empty, non-square, non-finite or
    ///   asymmetric
    /// - `DegenerateInput` if it is singular or has zero variance
    /// - `Convergence` if the search exhausts its budget or ends without
    ///   equal contributions
    ///
    /// # Example
    ///
    /// ```rust
    /// use folio_risk::RiskParityOptimizer;
    /// use nalgebra::DMatrix;
    ///
    /// // Uncorrelated assets, the second twice as volatile
    /// let cov = DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.04]);
    /// let result = RiskParityOptimizer::default().optimize(&cov).unwrap();
    ///
    /// // Weights inversely proportional to volatility: 2/3 and 1/3
    /// assert!((result.weights[0] - 2.0 / 3.0).abs() < 1e-6);
    /// ```
    pub fn optimize(&self, covariance: &DMatrix<f64>) -> RiskResult<RiskParityResult> {
        let n = covariance.nrows();
        if n == 0 {
            return Err(RiskError::validation("Covariance matrix is empty"));
        }
        ensure_symmetric(covariance, SYMMETRY_TOLERANCE).map_err(|e| {
            RiskError::validation_with_details("Invalid covariance matrix", vec![e.to_string()])
        })?;

        let scale = covariance.diagonal().mean();
        if scale <= 0.0 {
            return Err(RiskError::degenerate("All asset variances are zero"));
        }

        if n == 1 {
            return finish(covariance, vec![1.0], 0, 0.0);
        }

        // argmin f is invariant under C -> C / s
        let scaled = covariance / scale;
        ensure_positive_definite(&scaled)?;

        let (start, barrier_iterations) = self.equal_contribution_start(&scaled)?;

        let objective = |w: &[f64]| -> MathResult<f64> {
            let (_, errors) = parity_errors(&scaled, w)?;
            Ok(errors.norm_squared())
        };
        let gradient = |w: &[f64]| -> MathResult<Vec<f64>> { parity_gradient(&scaled, w) };
        let project = |w: &[f64]| project_onto_simplex(w, 1.0);

        let solution = spectral_projected_gradient(
            objective,
            gradient,
            project,
            &start,
            &self.config.optimization_config(),
        )?;
        let iterations = barrier_iterations + solution.iterations;

        // Equal contributions, not the refinement's residual, decide acceptance
        let gap = parity_gap(&scaled, &solution.parameters)?;
        if gap > PARITY_TOLERANCE {
            tracing::warn!(
                assets = n,
                iterations,
                residual = solution.residual,
                parity_gap = gap,
                "risk parity optimization stopped away from equal contributions"
            );
            return Err(MathError::convergence_failed(iterations, solution.residual).into());
        }

        tracing::debug!(
            assets = n,
            iterations,
            refined = solution.converged,
            objective = solution.objective_value,
            parity_gap = gap,
            "risk parity optimization converged"
        );

        finish(
            covariance,
            solution.parameters,
            iterations,
            solution.objective_value,
        )
    }

    /// Solves the convex equal-contribution program and maps its minimizer
    /// to simplex weights `w_i ∝ z_i / s_i`, `s_i = sqrt(C_ii)`.
    ///
    /// Starts on the ray `z = t s`, which corresponds to equal weights, at
    /// the `t` minimizing the objective along it.
    fn equal_contribution_start(
        &self,
        covariance: &DMatrix<f64>,
    ) -> RiskResult<(Vec<f64>, u32)> {
        let n = covariance.nrows();
        let vols = covariance.diagonal().map(f64::sqrt);
        let correlation =
            DMatrix::from_fn(n, n, |i, j| covariance[(i, j)] / (vols[i] * vols[j]));
        let share = 1.0 / n as f64;

        let objective = |z: &[f64]| -> MathResult<f64> {
            let z = DVector::from_column_slice(z);
            let log_sum: f64 = z.iter().map(|v| v.ln()).sum();
            Ok(0.5 * z.dot(&(&correlation * &z)) - share * log_sum)
        };
        let gradient = |z: &[f64]| -> MathResult<Vec<f64>> {
            let rz = &correlation * DVector::from_column_slice(z);
            Ok(z.iter().zip(rz.iter()).map(|(zi, ri)| ri - share / zi).collect())
        };
        let project = |z: &[f64]| project_onto_lower_bound(z, BARRIER_FLOOR);

        // s' R s is the sum of all covariance entries
        let t = 1.0 / covariance.sum().sqrt();
        let initial: Vec<f64> = vols.iter().map(|s| t * s).collect();

        // The barrier objective can be negative; stop on the residual only
        let config = OptimizationConfig {
            objective_tolerance: f64::NEG_INFINITY,
            ..self.config.optimization_config()
        };
        let solution =
            spectral_projected_gradient(objective, gradient, project, &initial, &config)?;

        // A stalled line search is expected near the optimum; only an
        // exhausted budget is a failure here
        if !solution.converged && solution.iterations >= config.max_iterations {
            tracing::warn!(
                assets = n,
                iterations = solution.iterations,
                residual = solution.residual,
                "equal-contribution program did not converge"
            );
            return Err(
                MathError::convergence_failed(solution.iterations, solution.residual).into(),
            );
        }

        let (z, steps) = newton_refine(&correlation, solution.parameters, share)?;

        let mut weights: Vec<f64> = z.iter().zip(vols.iter()).map(|(z, s)| z / s).collect();
        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }

        let iterations = solution.iterations + steps;
        tracing::debug!(
            assets = n,
            iterations,
            newton_steps = steps,
            "equal-contribution start found"
        );
        Ok((weights, iterations))
    }
}

/// `R z - share / z`, the gradient of the convex equal-contribution program.
fn barrier_gradient(correlation: &DMatrix<f64>, z: &DVector<f64>, share: f64) -> DVector<f64> {
    correlation * z - z.map(|v| share / v)
}

/// Newton iteration on `R z - share / z = 0` with Hessian
/// `R + diag(share / z^2)`, positive definite for `z > 0`.
///
/// Steps are shortened to keep `z` positive. Stops as soon as a step fails
/// to reduce `||grad||_inf`.
fn newton_refine(
    correlation: &DMatrix<f64>,
    z: Vec<f64>,
    share: f64,
) -> MathResult<(Vec<f64>, u32)> {
    let mut z = DVector::from_vec(z);
    let mut grad = barrier_gradient(correlation, &z, share);
    let mut steps = 0;

    while steps < NEWTON_STEPS && grad.amax() > 0.0 {
        let hessian = correlation + DMatrix::from_diagonal(&z.map(|v| share / (v * v)));
        let step = Cholesky::new(hessian)
            .ok_or_else(|| MathError::singular("equal-contribution Hessian"))?
            .solve(&grad);

        if step.iter().any(|v| !v.is_finite()) {
            break;
        }
        let mut lambda = 1.0;
        while z.iter().zip(step.iter()).any(|(zi, di)| zi - lambda * di <= 0.0) {
            lambda *= 0.5;
        }

        let candidate = &z - &step * lambda;
        let candidate_grad = barrier_gradient(correlation, &candidate, share);
        let improved = candidate_grad.iter().all(|v| v.is_finite())
            && candidate_grad.amax() < grad.amax();
        if !improved {
            break;
        }

        z = candidate;
        grad = candidate_grad;
        steps += 1;
    }

    Ok((z.iter().copied().collect(), steps))
}

/// Renormalizes weights and recomputes metrics on the unscaled covariance.
fn finish(
    covariance: &DMatrix<f64>,
    mut weights: Vec<f64>,
    iterations: u32,
    objective: f64,
) -> RiskResult<RiskParityResult> {
    for w in &mut weights {
        *w = w.max(0.0);
    }
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(RiskError::internal(format!(
            "Optimized weights sum to {}",
            total
        )));
    }
    for w in &mut weights {
        *w /= total;
    }

    let breakdown = RiskBreakdown::compute(covariance, &DVector::from_column_slice(&weights))?;
    let risk_contributions: Vec<f64> = breakdown.contributions.iter().copied().collect();

    if !breakdown.volatility.is_finite()
        || weights.iter().chain(&risk_contributions).any(|v| !v.is_finite())
    {
        return Err(RiskError::internal("Non-finite risk parity metrics"));
    }

    Ok(RiskParityResult {
        weights,
        risk_contributions,
        portfolio_volatility: breakdown.volatility,
        iterations,
        objective,
        method: METHOD,
    })
}

/// Risk breakdown plus the parity errors `RC_i - sigma / n`.
fn parity_errors(
    covariance: &DMatrix<f64>,
    w: &[f64],
) -> MathResult<(RiskBreakdown, DVector<f64>)> {
    let weights = DVector::from_column_slice(w);
    let breakdown = RiskBreakdown::compute(covariance, &weights)?;
    if breakdown.volatility < VOLATILITY_FLOOR {
        return Err(MathError::DivisionByZero {
            value: breakdown.volatility,
        });
    }

    let target = breakdown.volatility / w.len() as f64;
    let errors = breakdown.contributions.add_scalar(-target);
    Ok((breakdown, errors))
}

/// `max_i |RC_i - sigma / n| / sigma`.
fn parity_gap(covariance: &DMatrix<f64>, w: &[f64]) -> MathResult<f64> {
    let (breakdown, errors) = parity_errors(covariance, w)?;
    Ok(errors.amax() / breakdown.volatility)
}

/// Analytic gradient of the parity objective.
///
/// With `e = RC - sigma/n`, `m = C w` and `a = e .* w`:
///
/// ```text
/// grad f = (2 / sigma) [ e .* m + C a - (a . m / sigma^2) m - (sum e / n) m ]
/// ```
fn parity_gradient(covariance: &DMatrix<f64>, w: &[f64]) -> MathResult<Vec<f64>> {
    let (breakdown, errors) = parity_errors(covariance, w)?;
    let RiskBreakdown {
        volatility,
        marginal,
        ..
    } = breakdown;

    let weights = DVector::from_column_slice(w);
    let a = errors.component_mul(&weights);
    let coupling = a.dot(&marginal) / (volatility * volatility) + errors.sum() / w.len() as f64;

    let grad = (errors.component_mul(&marginal) + covariance * &a - &marginal * coupling)
        * (2.0 / volatility);
    Ok(grad.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn objective(cov: &DMatrix<f64>, w: &[f64]) -> f64 {
        parity_errors(cov, w).unwrap().1.norm_squared()
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.3, -0.2, 0.3, 2.0, 0.4, -0.2, 0.4, 0.5],
        );
        let w = [0.2, 0.5, 0.3];
        let grad = parity_gradient(&cov, &w).unwrap();

        let h = 1e-6;
        for j in 0..3 {
            let mut up = w;
            let mut down = w;
            up[j] += h;
            down[j] -= h;
            let numeric = (objective(&cov, &up) - objective(&cov, &down)) / (2.0 * h);
            assert_relative_eq!(grad[j], numeric, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_equal_variance_diagonal_gives_equal_weights() {
        let cov = DMatrix::from_diagonal(&DVector::from_element(4, 0.0004));
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        for w in &result.weights {
            assert_relative_eq!(*w, 0.25, epsilon = 1e-3);
        }
        assert_eq!(result.method, "SPG");
    }

    #[test]
    fn test_two_uncorrelated_assets() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.0004, 0.0, 0.0, 0.0004]);
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        assert_relative_eq!(result.weights[0], 0.5, epsilon = 1e-3);
        assert_relative_eq!(result.weights[1], 0.5, epsilon = 1e-3);
        assert_relative_eq!(
            result.risk_contributions[0],
            result.risk_contributions[1],
            epsilon = 1e-3
        );
        // sigma = sqrt(0.25 * 0.0004 * 2)
        assert_relative_eq!(result.portfolio_volatility, 0.0002_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_correlated_assets_equalize_contributions() {
        let vols = [0.1, 0.2, 0.3];
        let corr = [[1.0, 0.5, 0.2], [0.5, 1.0, 0.4], [0.2, 0.4, 1.0]];
        let cov = DMatrix::from_fn(3, 3, |i, j| vols[i] * vols[j] * corr[i][j]);

        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        let sum: f64 = result.weights.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        let target = result.portfolio_volatility / 3.0;
        for rc in &result.risk_contributions {
            assert_relative_eq!(*rc, target, epsilon = 1e-8);
        }
        let rc_sum: f64 = result.risk_contributions.iter().sum();
        assert_relative_eq!(rc_sum, result.portfolio_volatility, epsilon = 1e-12);
        // Lowest-volatility asset gets the largest weight
        assert!(result.weights[0] > result.weights[1]);
        assert!(result.weights[1] > result.weights[2]);
    }

    fn covariance_from(vols: &[f64], rho: f64) -> DMatrix<f64> {
        let n = vols.len();
        DMatrix::from_fn(n, n, |i, j| {
            let corr = if i == j { 1.0 } else { rho };
            vols[i] * vols[j] * corr
        })
    }

    fn assert_equal_contributions(result: &RiskParityResult, tol: f64) {
        let target = result.portfolio_volatility / result.weights.len() as f64;
        for rc in &result.risk_contributions {
            assert!(
                (rc - target).abs() <= tol * result.portfolio_volatility,
                "contribution {} vs target {}",
                rc,
                target
            );
        }
    }

    #[test]
    fn test_bond_equity_pair_with_negative_correlation() {
        // Monthly bond and equity vols, correlation -0.3. The vertex (1, 0)
        // is a local minimum of the parity objective.
        let cov = covariance_from(&[0.003, 0.012], -0.3);
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        // Two assets: weights inversely proportional to volatility
        assert_relative_eq!(result.weights[0], 0.8, epsilon = 1e-8);
        assert_relative_eq!(result.weights[1], 0.2, epsilon = 1e-8);
        assert_equal_contributions(&result, 1e-6);
        assert!(result.risk_contributions.iter().all(|&rc| rc > 0.0));
    }

    #[test]
    fn test_wide_volatility_spread_with_negative_correlation() {
        let cov = covariance_from(&[0.01, 0.2], -0.3);
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();
        assert_relative_eq!(result.weights[0], 20.0 / 21.0, epsilon = 1e-8);
        assert_equal_contributions(&result, 1e-6);

        // Equicorrelated: the solution is again w ∝ 1 / vol
        let vols = [0.005, 0.02, 0.3];
        let cov = covariance_from(&vols, -0.3);
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        let inverse_total: f64 = vols.iter().map(|v| 1.0 / v).sum();
        for (w, v) in result.weights.iter().zip(&vols) {
            assert_relative_eq!(*w, 1.0 / v / inverse_total, epsilon = 1e-8);
        }
        assert_equal_contributions(&result, 1e-6);
    }

    #[test]
    fn test_vertex_fails_parity_check() {
        let cov = covariance_from(&[0.003, 0.012], -0.3);
        assert!(parity_gap(&cov, &[1.0, 0.0]).unwrap() > PARITY_TOLERANCE);
        assert!(parity_gap(&cov, &[0.8, 0.2]).unwrap() < 1e-12);
    }

    #[test]
    fn test_mixed_sign_correlations() {
        let vols = [0.04, 0.15, 0.08, 0.25];
        let corr = [
            [1.0, -0.4, 0.1, -0.2],
            [-0.4, 1.0, 0.3, 0.6],
            [0.1, 0.3, 1.0, -0.5],
            [-0.2, 0.6, -0.5, 1.0],
        ];
        let cov = DMatrix::from_fn(4, 4, |i, j| vols[i] * vols[j] * corr[i][j]);

        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();

        assert_relative_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(result.weights.iter().all(|&w| w > 0.0 && w < 1.0));
        assert_equal_contributions(&result, 1e-6);
    }

    #[test]
    fn test_single_asset() {
        let cov = DMatrix::from_row_slice(1, 1, &[0.09]);
        let result = RiskParityOptimizer::default().optimize(&cov).unwrap();
        assert_eq!(result.weights, vec![1.0]);
        assert_relative_eq!(result.portfolio_volatility, 0.3, epsilon = 1e-15);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_singular_covariance_is_degenerate() {
        // Second asset is a copy of the first
        let cov = DMatrix::from_row_slice(
            3,
            3,
            &[0.04, 0.04, 0.01, 0.04, 0.04, 0.01, 0.01, 0.01, 0.02],
        );
        let err = RiskParityOptimizer::default().optimize(&cov).unwrap_err();
        assert!(matches!(err, RiskError::DegenerateInput { .. }));
    }

    #[test]
    fn test_zero_covariance_is_degenerate() {
        let cov = DMatrix::zeros(2, 2);
        let err = RiskParityOptimizer::default().optimize(&cov).unwrap_err();
        assert_eq!(err.code(), "DEGENERATE_INPUT");
    }

    #[test]
    fn test_malformed_covariance_is_validation_error() {
        let rect = DMatrix::from_row_slice(1, 2, &[0.1, 0.2]);
        assert_eq!(
            RiskParityOptimizer::default().optimize(&rect).unwrap_err().code(),
            "VALIDATION_ERROR"
        );

        let asym = DMatrix::from_row_slice(2, 2, &[0.1, 0.02, 0.03, 0.1]);
        assert_eq!(
            RiskParityOptimizer::default().optimize(&asym).unwrap_err().code(),
            "VALIDATION_ERROR"
        );

        let nan = DMatrix::from_row_slice(2, 2, &[0.1, f64::NAN, f64::NAN, 0.1]);
        assert_eq!(
            RiskParityOptimizer::default().optimize(&nan).unwrap_err().code(),
            "VALIDATION_ERROR"
        );

        assert!(RiskParityOptimizer::default()
            .optimize(&DMatrix::zeros(0, 0))
            .is_err());
    }

    #[test]
    fn test_iteration_budget_is_convergence_error() {
        let vols = [0.1, 0.2, 0.3];
        let cov = DMatrix::from_fn(3, 3, |i, j| {
            if i == j {
                vols[i] * vols[i]
            } else {
                0.3 * vols[i] * vols[j]
            }
        });
        let optimizer = RiskParityOptimizer::new(EngineConfig::new().with_max_iterations(1));

        let err = optimizer.optimize(&cov).unwrap_err();
        assert!(matches!(err, RiskError::Convergence { iterations: 1, .. }));
        assert_eq!(err.code(), "OPTIMIZATION_ERROR");
    }
}
