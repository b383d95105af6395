//! Optimization algorithms.
//!
//! This module provides constrained minimization over closed convex sets
//! via projection:
//!
//! - [`spectral_projected_gradient`]: first-order solver with
//!   Barzilai-Borwein step lengths and Armijo backtracking
//! - [`project_onto_simplex`]: Euclidean projection onto
//!   `{x : sum(x) = total, x >= 0}`
//! - [`project_onto_lower_bound`]: projection onto `{x : x >= floor}`
//!
//! Objective and gradient callbacks are fallible so that a caller can abort
//! the search when it reaches a point where its objective is undefined.

mod projection;

pub use projection::{project_onto_lower_bound, project_onto_simplex};

use crate::error::{MathError, MathResult};

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationConfig {
    /// Tolerance on the projected-gradient residual `||P(x - g) - x||_inf`.
    pub tolerance: f64,
    /// Objective value at or below which the search stops.
    pub objective_tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            objective_tolerance: 1e-20,
            max_iterations: 1000,
        }
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Optimal parameters found.
    pub parameters: Vec<f64>,
    /// Final objective function value.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final projected-gradient residual.
    pub residual: f64,
    /// Whether the optimization converged.
    pub converged: bool,
}

const ALPHA_MIN: f64 = 1e-10;
const ALPHA_MAX: f64 = 1e10;
const ARMIJO: f64 = 1e-4;
const MIN_LAMBDA: f64 = 1e-16;

/// Spectral projected gradient (SPG) minimizer.
///
/// Minimizes `objective` over the convex set defined by `project`, starting
/// from `project(initial)`. Every iterate is feasible: trial points are
/// projections, and accepted points are convex combinations of feasible
/// points.
///
/// Returns `Ok` with `converged == false` when the iteration budget runs out
/// or the line search stalls before either tolerance is met. Errors from the
/// callbacks are propagated unchanged.
///
/// # Example
///
/// ```rust
/// use folio_math::optimization::{
///     project_onto_simplex, spectral_projected_gradient, OptimizationConfig,
/// };
///
/// // Closest point of the probability simplex to (1, 0.2)
/// let target = [1.0, 0.2];
/// let f = |x: &[f64]| Ok(x.iter().zip(&target).map(|(a, b)| (a - b).powi(2)).sum());
/// let g = |x: &[f64]| Ok(x.iter().zip(&target).map(|(a, b)| 2.0 * (a - b)).collect());
/// let p = |x: &[f64]| project_onto_simplex(x, 1.0);
///
/// let result = spectral_projected_gradient(f, g, p, &[0.5, 0.5], &OptimizationConfig::default())
///     .unwrap();
/// assert!(result.converged);
/// assert!((result.parameters[0] - 0.9).abs() < 1e-8);
/// ```
pub fn spectral_projected_gradient<F, G, P>(
    objective: F,
    gradient: G,
    project: P,
    initial: &[f64],
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> MathResult<f64>,
    G: Fn(&[f64]) -> MathResult<Vec<f64>>,
    P: Fn(&[f64]) -> MathResult<Vec<f64>>,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }

    let mut x = project(initial)?;
    let mut f = objective(&x)?;
    let mut g = gradient(&x)?;
    if g.len() != n {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: 1,
            rows2: g.len(),
            cols2: 1,
        });
    }
    check_finite(f, &g)?;

    let mut residual = projected_residual(&x, &g, &project)?;
    let mut alpha = initial_step(&x, &g, residual);

    for iteration in 0..config.max_iterations {
        if residual <= config.tolerance || f <= config.objective_tolerance {
            log::debug!(
                "SPG converged after {} iterations (f = {:.3e}, residual = {:.3e})",
                iteration,
                f,
                residual
            );
            return Ok(OptimizationResult {
                parameters: x,
                objective_value: f,
                iterations: iteration,
                residual,
                converged: true,
            });
        }

        // Feasible search direction
        let trial: Vec<f64> = x.iter().zip(&g).map(|(xi, gi)| xi - alpha * gi).collect();
        let target = project(&trial)?;
        let direction: Vec<f64> = target.iter().zip(&x).map(|(t, xi)| t - xi).collect();
        let slope: f64 = g.iter().zip(&direction).map(|(gi, di)| gi * di).sum();

        // Backtracking along the segment [x, target]
        let mut lambda = 1.0;
        let (x_new, f_new) = loop {
            let candidate: Vec<f64> = x
                .iter()
                .zip(&direction)
                .map(|(xi, di)| xi + lambda * di)
                .collect();
            let f_candidate = objective(&candidate)?;
            if f_candidate.is_finite() && f_candidate <= f + ARMIJO * lambda * slope {
                break (candidate, f_candidate);
            }

            lambda *= 0.5;
            if lambda < MIN_LAMBDA {
                log::warn!(
                    "SPG line search stalled at iteration {} (f = {:.3e}, residual = {:.3e})",
                    iteration,
                    f,
                    residual
                );
                return Ok(OptimizationResult {
                    parameters: x,
                    objective_value: f,
                    iterations: iteration,
                    residual,
                    converged: false,
                });
            }
        };

        let g_new = gradient(&x_new)?;
        check_finite(f_new, &g_new)?;

        // Barzilai-Borwein step for the next iteration
        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let ss: f64 = s.iter().map(|v| v * v).sum();
        let sy: f64 = s
            .iter()
            .zip(g_new.iter().zip(&g))
            .map(|(si, (gn, go))| si * (gn - go))
            .sum();
        alpha = if sy <= 0.0 {
            ALPHA_MAX
        } else {
            (ss / sy).clamp(ALPHA_MIN, ALPHA_MAX)
        };

        x = x_new;
        f = f_new;
        g = g_new;
        residual = projected_residual(&x, &g, &project)?;
    }

    let converged = residual <= config.tolerance || f <= config.objective_tolerance;
    if !converged {
        log::warn!(
            "SPG exhausted {} iterations (f = {:.3e}, residual = {:.3e})",
            config.max_iterations,
            f,
            residual
        );
    }

    Ok(OptimizationResult {
        parameters: x,
        objective_value: f,
        iterations: config.max_iterations,
        residual,
        converged,
    })
}

/// First trial step: `1 / residual`, capped so that `alpha * ||g||_inf` does
/// not exceed `||x||_inf`. Without the cap the first trial point from an
/// interior start can land on a vertex of the feasible set.
fn initial_step(x: &[f64], g: &[f64], residual: f64) -> f64 {
    let x_norm = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let g_norm = g.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    let mut alpha = 1.0 / residual.max(f64::MIN_POSITIVE);
    if g_norm > 0.0 && x_norm > 0.0 {
        alpha = alpha.min(x_norm / g_norm);
    }
    alpha.clamp(ALPHA_MIN, ALPHA_MAX)
}

/// `||P(x - g) - x||_inf`, zero exactly at constrained stationary points.
fn projected_residual<P>(x: &[f64], g: &[f64], project: &P) -> MathResult<f64>
where
    P: Fn(&[f64]) -> MathResult<Vec<f64>>,
{
    let stepped: Vec<f64> = x.iter().zip(g).map(|(xi, gi)| xi - gi).collect();
    let projected = project(&stepped)?;
    Ok(projected
        .iter()
        .zip(x)
        .map(|(p, xi)| (p - xi).abs())
        .fold(0.0, f64::max))
}

fn check_finite(f: f64, g: &[f64]) -> MathResult<()> {
    if !f.is_finite() {
        return Err(MathError::non_finite("objective"));
    }
    if g.iter().any(|v| !v.is_finite()) {
        return Err(MathError::non_finite("gradient"));
    }
    Ok(())
}
