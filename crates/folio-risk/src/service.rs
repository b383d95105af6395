//! Request-level entry points.
//!
//! Each function validates a request, derives return statistics for the
//! portfolio's assets, runs one engine component and wraps the result in its
//! response envelope. All of them are synchronous and CPU-bound.

use std::collections::BTreeMap;

use chrono::Utc;
use nalgebra::DVector;
use uuid::Uuid;

use folio_core::Portfolio;

use crate::config::EngineConfig;
use crate::error::RiskResult;
use crate::monte_carlo::MonteCarloSimulator;
use crate::random::{ChaChaNormals, NormalSource};
use crate::request::{OptimizationRequest, SimulationRequest};
use crate::response::{
    OptimizationMetrics, OptimizationOutput, OptimizationParameters, OptimizationResponse,
    SimulationOutput, SimulationParameters, SimulationResponse,
};
use crate::returns::ReturnsStatistics;
use crate::risk_parity::RiskParityOptimizer;

/// Optimization kind reported in risk parity envelopes.
pub const RISK_PARITY_KIND: &str = "risk-parity";

/// Runs a Monte Carlo simulation for `portfolio`.
///
/// Uses `request.seed` when present, otherwise a random seed that is
/// reported in the response parameters.
pub fn run_simulation(
    portfolio: &Portfolio,
    request: &SimulationRequest,
    config: &EngineConfig,
) -> RiskResult<SimulationResponse> {
    let source = request
        .seed
        .map_or_else(ChaChaNormals::from_entropy, ChaChaNormals::new);
    run_simulation_with_source(portfolio, request, config, &source, source.seed())
}

/// Runs a Monte Carlo simulation with an explicit draw source.
///
/// `seed` is only echoed in the response parameters.
pub fn run_simulation_with_source<S>(
    portfolio: &Portfolio,
    request: &SimulationRequest,
    config: &EngineConfig,
    source: &S,
    seed: u64,
) -> RiskResult<SimulationResponse>
where
    S: NormalSource + ?Sized,
{
    let params = request.validate(config)?;
    let stats = ReturnsStatistics::from_series(&portfolio.tickers(), &request.returns)?;
    let weights = DVector::from_vec(portfolio.weights());

    let simulation = MonteCarloSimulator::new(config.clone()).simulate(
        &weights,
        stats.mean_returns(),
        stats.covariance(),
        &params,
        source,
    )?;

    tracing::info!(
        portfolio = %portfolio.id(),
        paths = params.num_simulations,
        periods = params.num_periods,
        seed,
        mean_final_value = simulation.statistics.mean_final_value,
        "simulation complete"
    );

    Ok(SimulationResponse {
        id: Uuid::new_v4().to_string(),
        portfolio_id: portfolio.id().to_string(),
        parameters: SimulationParameters {
            initial_investment: params.initial_investment,
            num_simulations: params.num_simulations,
            num_periods: params.num_periods,
            seed,
        },
        result: SimulationOutput {
            trajectories: simulation.trajectory_rows(),
            statistics: simulation.statistics,
        },
        created_at: Utc::now(),
    })
}

/// Computes risk parity weights for `portfolio`'s assets.
pub fn run_risk_parity(
    portfolio: &Portfolio,
    request: &OptimizationRequest,
    config: &EngineConfig,
) -> RiskResult<OptimizationResponse> {
    request.validate()?;
    let stats = ReturnsStatistics::from_series(&portfolio.tickers(), &request.returns)?;

    let optimizer = RiskParityOptimizer::new(config.clone());
    let allocation = optimizer.optimize(stats.covariance())?;

    let by_ticker = |values: &[f64]| -> BTreeMap<String, f64> {
        stats
            .assets()
            .iter()
            .zip(values)
            .map(|(ticker, v)| (ticker.to_string(), *v))
            .collect()
    };

    tracing::info!(
        portfolio = %portfolio.id(),
        assets = stats.num_assets(),
        iterations = allocation.iterations,
        volatility = allocation.portfolio_volatility,
        "risk parity optimization complete"
    );

    Ok(OptimizationResponse {
        id: Uuid::new_v4().to_string(),
        portfolio_id: portfolio.id().to_string(),
        kind: RISK_PARITY_KIND.to_string(),
        parameters: OptimizationParameters {
            method: allocation.method.to_string(),
            max_iterations: config.max_iterations,
        },
        result: OptimizationOutput {
            weights: by_ticker(&allocation.weights),
            metrics: OptimizationMetrics {
                portfolio_volatility: allocation.portfolio_volatility,
                risk_contribution: by_ticker(&allocation.risk_contributions),
            },
        },
        created_at: Utc::now(),
    })
}
