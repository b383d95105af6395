//! Monte Carlo simulation of portfolio value.
//!
//! Every path compounds i.i.d. normal period returns drawn from the
//! portfolio's aggregate mean and volatility:
//!
//! ```text
//! r_t      = mu + sigma * z_t,   z_t ~ N(0, 1)
//! value_0  = initial investment
//! value_t  = value_{t-1} * (1 + r_t)
//! ```
//!
//! Paths are independent, so they fan out across rayon's pool when the
//! engine config allows it. Draws come from an injected [`NormalSource`]
//! keyed by path index, which makes the output independent of scheduling.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use folio_core::WEIGHT_SUM_TOLERANCE;
use folio_math::linear_algebra::quadratic_form;

use crate::config::EngineConfig;
use crate::error::{RiskError, RiskResult};
use crate::random::NormalSource;
use crate::summary::StatisticsSummary;

/// Negative variance (relative to the largest asset variance) still treated
/// as rounding noise.
const VARIANCE_ROUNDING_TOLERANCE: f64 = 1e-12;

/// Size of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    /// Starting portfolio value.
    pub initial_investment: f64,
    /// Number of independent paths.
    pub num_simulations: usize,
    /// Number of compounding periods per path.
    pub num_periods: usize,
}

/// Aggregate per-period moments of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioMoments {
    /// `w . mu`
    pub mean: f64,
    /// `sqrt(w' Cov w)`
    pub volatility: f64,
}

impl PortfolioMoments {
    /// Computes portfolio mean and volatility.
    ///
    /// A slightly negative variance from rounding is clamped to zero; a
    /// materially negative or non-finite one means the covariance matrix is
    /// not positive semi-definite.
    pub fn compute(
        weights: &DVector<f64>,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
    ) -> RiskResult<Self> {
        let mean = weights.dot(mean_returns);
        let variance = quadratic_form(covariance, weights)?;

        let scale = covariance
            .diagonal()
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if !variance.is_finite() {
            return Err(RiskError::degenerate(format!(
                "Portfolio variance is not finite: {}",
                variance
            )));
        }
        if variance < -VARIANCE_ROUNDING_TOLERANCE * scale {
            return Err(RiskError::degenerate(format!(
                "Portfolio variance is negative ({:.3e}); covariance matrix is not positive semi-definite",
                variance
            )));
        }

        Ok(Self {
            mean,
            volatility: variance.max(0.0).sqrt(),
        })
    }
}

/// Output of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// `num_simulations x (num_periods + 1)` portfolio values; column 0 is
    /// the initial investment.
    pub trajectories: Array2<f64>,
    /// Summary of the final column.
    pub statistics: StatisticsSummary,
    /// Moments the paths were drawn from.
    pub moments: PortfolioMoments,
}

impl SimulationResult {
    /// Final value of every path.
    pub fn final_values(&self) -> Vec<f64> {
        self.trajectories
            .index_axis(Axis(1), self.trajectories.ncols() - 1)
            .to_vec()
    }

    /// Trajectories as nested rows.
    pub fn trajectory_rows(&self) -> Vec<Vec<f64>> {
        self.trajectories
            .outer_iter()
            .map(|row| row.to_vec())
            .collect()
    }
}

/// Compounds `draws` into a value path.
///
/// `out` must have room for `draws.len() + 1` values; `out[0]` is set to
/// `initial` exactly.
///
/// # Example
///
/// ```rust
/// use folio_risk::monte_carlo::compound_path;
///
/// let mut path = [0.0; 3];
/// compound_path(10_000.0, &[0.01, -0.005], &mut path).unwrap();
/// assert_eq!(path[0], 10_000.0);
/// assert!((path[1] - 10_100.0).abs() < 1e-9);
/// assert!((path[2] - 10_049.5).abs() < 1e-9);
/// ```
pub fn compound_path(initial: f64, draws: &[f64], out: &mut [f64]) -> RiskResult<()> {
    if out.len() != draws.len() + 1 {
        return Err(RiskError::validation(format!(
            "Path buffer holds {} values, expected {}",
            out.len(),
            draws.len() + 1
        )));
    }

    out[0] = initial;
    for (t, r) in draws.iter().enumerate() {
        out[t + 1] = out[t] * (1.0 + r);
    }
    Ok(())
}

/// Monte Carlo simulator.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    config: EngineConfig,
}

impl MonteCarloSimulator {
    /// Creates a simulator with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulates portfolio value trajectories.
    ///
    /// All inputs are validated before any path is generated.
    pub fn simulate<S>(
        &self,
        weights: &DVector<f64>,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
        params: &SimulationParams,
        source: &S,
    ) -> RiskResult<SimulationResult>
    where
        S: NormalSource + ?Sized,
    {
        self.validate(weights, mean_returns, covariance, params)?;

        let moments = PortfolioMoments::compute(weights, mean_returns, covariance)?;
        let SimulationParams {
            initial_investment,
            num_simulations,
            num_periods,
        } = *params;
        let columns = num_periods + 1;
        let parallel = self.config.should_parallelize(num_simulations);

        tracing::debug!(
            paths = num_simulations,
            periods = num_periods,
            mean = moments.mean,
            volatility = moments.volatility,
            parallel,
            "running Monte Carlo simulation"
        );

        let fill = |(path, row): (usize, &mut [f64])| -> RiskResult<()> {
            let mut draws = vec![0.0; num_periods];
            source.fill_standard_normals(path, &mut draws);
            for d in &mut draws {
                *d = moments.mean + moments.volatility * *d;
            }
            compound_path(initial_investment, &draws, row)
        };

        let mut values = vec![0.0; num_simulations * columns];
        if parallel {
            values.par_chunks_mut(columns).enumerate().try_for_each(&fill)?;
        } else {
            values.chunks_mut(columns).enumerate().try_for_each(&fill)?;
        }

        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(RiskError::internal(format!(
                "Non-finite portfolio value in path {} period {}",
                i / columns,
                i % columns
            )));
        }

        let trajectories = Array2::from_shape_vec((num_simulations, columns), values)
            .map_err(|e| RiskError::internal(format!("Trajectory matrix: {}", e)))?;
        let final_values = trajectories.column(num_periods).to_vec();
        let statistics = StatisticsSummary::from_values(&final_values)?;

        Ok(SimulationResult {
            trajectories,
            statistics,
            moments,
        })
    }

    fn validate(
        &self,
        weights: &DVector<f64>,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
        params: &SimulationParams,
    ) -> RiskResult<()> {
        let mut details = Vec::new();

        if !(params.initial_investment.is_finite() && params.initial_investment > 0.0) {
            details.push(format!(
                "initialInvestment must be positive, got {}",
                params.initial_investment
            ));
        }
        if params.num_simulations == 0 {
            details.push("numSimulations must be positive".to_string());
        }
        if params.num_periods == 0 {
            details.push("numPeriods must be positive".to_string());
        }
        details.extend(
            self.config
                .simulation_size_violations(params.num_simulations, params.num_periods),
        );

        let n = weights.len();
        if n == 0 {
            details.push("weights must not be empty".to_string());
        }
        if mean_returns.len() != n {
            details.push(format!(
                "meanReturns has length {}, expected {}",
                mean_returns.len(),
                n
            ));
        }
        if covariance.shape() != (n, n) {
            details.push(format!(
                "covariance is {}x{}, expected {}x{}",
                covariance.nrows(),
                covariance.ncols(),
                n,
                n
            ));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            details.push("weights must be finite".to_string());
        } else if n > 0 && (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            details.push(format!("weights must sum to 1.0, got {}", weights.sum()));
        }
        if mean_returns.iter().any(|m| !m.is_finite()) {
            details.push("meanReturns must be finite".to_string());
        }
        if covariance.iter().any(|c| !c.is_finite()) {
            details.push("covariance must be finite".to_string());
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(RiskError::validation_with_details(
                "Invalid simulation input",
                details,
            ))
        }
    }
}
