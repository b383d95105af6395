//! Response contracts for engine operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::StatisticsSummary;

/// Parameters a simulation actually ran with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Starting portfolio value.
    pub initial_investment: f64,
    /// Number of paths.
    pub num_simulations: usize,
    /// Number of periods per path.
    pub num_periods: usize,
    /// Seed that replays this run.
    pub seed: u64,
}

/// Simulated trajectories and their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    /// One row per path, `numPeriods + 1` values each.
    pub trajectories: Vec<Vec<f64>>,
    /// Summary of final values.
    pub statistics: StatisticsSummary,
}

/// Monte Carlo simulation response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    /// Result identifier.
    pub id: String,
    /// Simulated portfolio.
    pub portfolio_id: String,
    /// Run parameters.
    pub parameters: SimulationParameters,
    /// Run output.
    pub result: SimulationOutput,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Parameters of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationParameters {
    /// Solver name.
    pub method: String,
    /// Solver iteration budget.
    pub max_iterations: u32,
}

/// Risk metrics of optimized weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationMetrics {
    /// Portfolio volatility.
    pub portfolio_volatility: f64,
    /// Ticker -> contribution to volatility.
    pub risk_contribution: BTreeMap<String, f64>,
}

/// Optimized weights and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutput {
    /// Ticker -> weight.
    pub weights: BTreeMap<String, f64>,
    /// Risk metrics at `weights`.
    pub metrics: OptimizationMetrics,
}

/// Risk parity optimization response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    /// Result identifier.
    pub id: String,
    /// Optimized portfolio.
    pub portfolio_id: String,
    /// Optimization kind, always `"risk-parity"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Run parameters.
    pub parameters: OptimizationParameters,
    /// Run output.
    pub result: OptimizationOutput,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
