//! # folio-risk
//!
//! Portfolio risk engine.
//!
//! This crate provides:
//!
//! - **Returns statistics**: mean vector and sample covariance from return series
//! - **Monte Carlo**: portfolio value trajectories with injectable draw sources
//! - **Risk parity**: equal risk contribution weights via projected gradient
//! - **Summaries**: mean, median, extrema, dispersion and percentiles of outcomes
//! - **Service**: request validation and response envelopes for each operation
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use folio_core::PortfolioBuilder;
//! use folio_risk::prelude::*;
//!
//! let portfolio = PortfolioBuilder::new()
//!     .name("Balanced")
//!     .asset("SPY", 0.6)
//!     .asset("AGG", 0.4)
//!     .build()
//!     .unwrap();
//!
//! let returns = BTreeMap::from([
//!     ("SPY".to_string(), vec![0.010, -0.020, 0.015, 0.004, -0.006]),
//!     ("AGG".to_string(), vec![0.002, 0.001, -0.001, 0.003, 0.000]),
//! ]);
//!
//! let mut request = SimulationRequest::new(portfolio.id().as_str(), returns);
//! request.num_simulations = 100;
//! request.num_periods = 12;
//! request.seed = Some(7);
//!
//! let response = run_simulation(&portfolio, &request, &EngineConfig::default()).unwrap();
//! assert_eq!(response.result.trajectories.len(), 100);
//! assert_eq!(response.result.trajectories[0][0], 10_000.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod monte_carlo;
pub mod random;
pub mod request;
pub mod response;
pub mod returns;
pub mod risk_parity;
pub mod service;
pub mod summary;

pub use config::EngineConfig;
pub use error::{RiskError, RiskResult};
pub use monte_carlo::{MonteCarloSimulator, SimulationParams, SimulationResult};
pub use random::{ChaChaNormals, NormalSource};
pub use returns::ReturnsStatistics;
pub use risk_parity::{RiskParityOptimizer, RiskParityResult};
pub use summary::{Percentiles, StatisticsSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{RiskError, RiskResult};
    pub use crate::monte_carlo::{compound_path, MonteCarloSimulator, SimulationParams};
    pub use crate::random::{ChaChaNormals, NormalSource};
    pub use crate::request::{OptimizationRequest, SimulationRequest};
    pub use crate::response::{OptimizationResponse, SimulationResponse};
    pub use crate::returns::ReturnsStatistics;
    pub use crate::risk_parity::RiskParityOptimizer;
    pub use crate::service::{run_risk_parity, run_simulation};
    pub use crate::summary::StatisticsSummary;
}
