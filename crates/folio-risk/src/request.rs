//! Request contracts for engine operations.
//!
//! Counts are deserialized as signed integers so that zero and negative
//! values reach validation and are reported with a field-level message.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{RiskError, RiskResult};
use crate::monte_carlo::SimulationParams;

fn default_initial_investment() -> f64 {
    10_000.0
}

fn default_num_simulations() -> i64 {
    1000
}

fn default_num_periods() -> i64 {
    252
}

/// Monte Carlo simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Portfolio to simulate.
    #[serde(default)]
    pub portfolio_id: String,

    /// Starting portfolio value.
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,

    /// Number of paths.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: i64,

    /// Number of periods per path.
    #[serde(default = "default_num_periods")]
    pub num_periods: i64,

    /// Ticker -> periodic return series.
    #[serde(default)]
    pub returns: BTreeMap<String, Vec<f64>>,

    /// Seed for a replayable run; random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimulationRequest {
    /// Creates a request with default sizes.
    pub fn new(portfolio_id: impl Into<String>, returns: BTreeMap<String, Vec<f64>>) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            initial_investment: default_initial_investment(),
            num_simulations: default_num_simulations(),
            num_periods: default_num_periods(),
            returns,
            seed: None,
        }
    }

    /// Validates the request against `config`, returning run parameters.
    ///
    /// All problems are reported together in the error details.
    pub fn validate(&self, config: &EngineConfig) -> RiskResult<SimulationParams> {
        let mut details = Vec::new();

        if self.portfolio_id.trim().is_empty() {
            details.push("portfolioId is required".to_string());
        }
        if !(self.initial_investment.is_finite() && self.initial_investment > 0.0) {
            details.push(format!(
                "initialInvestment must be positive, got {}",
                self.initial_investment
            ));
        }
        let num_simulations = positive_count("numSimulations", self.num_simulations, &mut details);
        let num_periods = positive_count("numPeriods", self.num_periods, &mut details);
        if let (Some(sims), Some(periods)) = (num_simulations, num_periods) {
            details.extend(config.simulation_size_violations(sims, periods));
        }
        if self.returns.is_empty() {
            details.push("returns is required".to_string());
        }

        match (num_simulations, num_periods) {
            (Some(num_simulations), Some(num_periods)) if details.is_empty() => {
                Ok(SimulationParams {
                    initial_investment: self.initial_investment,
                    num_simulations,
                    num_periods,
                })
            }
            _ => Err(RiskError::validation_with_details(
                "Invalid simulation request",
                details,
            )),
        }
    }
}

/// Risk parity optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    /// Portfolio whose assets are optimized.
    #[serde(default)]
    pub portfolio_id: String,

    /// Ticker -> periodic return series.
    #[serde(default)]
    pub returns: BTreeMap<String, Vec<f64>>,
}

impl OptimizationRequest {
    /// Creates a request.
    pub fn new(portfolio_id: impl Into<String>, returns: BTreeMap<String, Vec<f64>>) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            returns,
        }
    }

    /// Validates the request shape.
    pub fn validate(&self) -> RiskResult<()> {
        let mut details = Vec::new();
        if self.portfolio_id.trim().is_empty() {
            details.push("portfolioId is required".to_string());
        }
        if self.returns.is_empty() {
            details.push("returns is required".to_string());
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(RiskError::validation_with_details(
                "Invalid optimization request",
                details,
            ))
        }
    }
}

fn positive_count(field: &str, value: i64, details: &mut Vec<String>) -> Option<usize> {
    match usize::try_from(value) {
        Ok(count) if count > 0 => Some(count),
        _ => {
            details.push(format!("{} must be a positive integer, got {}", field, value));
            None
        }
    }
}
