//! Engine configuration.

use folio_math::optimization::OptimizationConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// Configuration for the risk engine.
///
/// Controls path fan-out, optimizer tolerances, and the work ceilings that
/// bound the latency of a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enable parallel path generation.
    pub parallel: bool,

    /// Minimum path count to trigger parallel generation.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,

    /// Optimizer iteration budget.
    pub max_iterations: u32,

    /// Projected-gradient residual at which the optimizer stops.
    pub tolerance: f64,

    /// Objective value at which the optimizer stops.
    pub objective_tolerance: f64,

    /// Largest accepted `numSimulations`.
    pub max_simulations: usize,

    /// Largest accepted `numPeriods`.
    pub max_periods: usize,

    /// Largest accepted trajectory matrix, in cells.
    pub max_trajectory_cells: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 256,
            max_iterations: 1000,
            tolerance: 1e-10,
            objective_tolerance: 1e-20,
            max_simulations: 100_000,
            max_periods: 10_000,
            max_trajectory_cells: 50_000_000,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always generates paths sequentially.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets whether to use parallel path generation.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel path generation.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the optimizer iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the projected-gradient tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the objective tolerance.
    #[must_use]
    pub fn with_objective_tolerance(mut self, tolerance: f64) -> Self {
        self.objective_tolerance = tolerance;
        self
    }

    /// Sets the maximum number of simulated paths.
    #[must_use]
    pub fn with_max_simulations(mut self, max: usize) -> Self {
        self.max_simulations = max;
        self
    }

    /// Sets the maximum number of periods per path.
    #[must_use]
    pub fn with_max_periods(mut self, max: usize) -> Self {
        self.max_periods = max;
        self
    }

    /// Sets the maximum trajectory matrix size.
    #[must_use]
    pub fn with_max_trajectory_cells(mut self, max: usize) -> Self {
        self.max_trajectory_cells = max;
        self
    }

    /// Returns true if parallel generation should be used for `paths` paths.
    #[must_use]
    pub fn should_parallelize(&self, paths: usize) -> bool {
        self.parallel && paths >= self.parallel_threshold
    }

    /// Solver settings derived from this config.
    #[must_use]
    pub fn optimization_config(&self) -> OptimizationConfig {
        OptimizationConfig {
            tolerance: self.tolerance,
            objective_tolerance: self.objective_tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Checks a simulation size against the work ceilings.
    ///
    /// Returns one message per exceeded ceiling.
    #[must_use]
    pub fn simulation_size_violations(&self, num_simulations: usize, num_periods: usize) -> Vec<String> {
        let mut violations = Vec::new();
        if num_simulations > self.max_simulations {
            violations.push(format!(
                "numSimulations must be at most {}, got {}",
                self.max_simulations, num_simulations
            ));
        }
        if num_periods > self.max_periods {
            violations.push(format!(
                "numPeriods must be at most {}, got {}",
                self.max_periods, num_periods
            ));
        }
        let cells = num_simulations.saturating_mul(num_periods.saturating_add(1));
        if cells > self.max_trajectory_cells {
            violations.push(format!(
                "Trajectory matrix of {} cells exceeds the limit of {}",
                cells, self.max_trajectory_cells
            ));
        }
        violations
    }

    /// Validates the configuration itself.
    pub fn validate(&self) -> RiskResult<()> {
        let mut details = Vec::new();
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            details.push(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if !(self.objective_tolerance.is_finite() && self.objective_tolerance >= 0.0) {
            details.push(format!(
                "objective_tolerance must be non-negative, got {}",
                self.objective_tolerance
            ));
        }
        if self.max_iterations == 0 {
            details.push("max_iterations must be positive".to_string());
        }
        if self.max_simulations == 0 || self.max_periods == 0 || self.max_trajectory_cells == 0 {
            details.push("simulation limits must be positive".to_string());
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(RiskError::validation_with_details(
                "Invalid engine configuration",
                details,
            ))
        }
    }
}
