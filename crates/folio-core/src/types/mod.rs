//! Domain types for portfolio analytics.
//!
//! - [`Ticker`]: Validated asset ticker symbol
//! - [`PortfolioId`]: Portfolio identifier
//! - [`Portfolio`]: Validated, immutable set of weighted holdings
//! - [`PortfolioBuilder`]: Fluent construction of a [`Portfolio`]
//! - [`PortfolioUpdate`]: Partial update applied to an existing [`Portfolio`]

mod ids;
mod portfolio;

pub use ids::{PortfolioId, Ticker, MAX_TICKER_LEN};
pub use portfolio::{Portfolio, PortfolioBuilder, PortfolioUpdate, WEIGHT_SUM_TOLERANCE};
