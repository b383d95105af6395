//! Error types for the Folio core crate.
//!
//! Portfolio construction and lookup failures are reported here; numerical
//! failures live in `folio-math` and `folio-risk`.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The error type for portfolio construction and lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Portfolio failed validation.
    #[error("Invalid portfolio: {reason}")]
    InvalidPortfolio {
        /// Description of what's invalid.
        reason: String,
    },

    /// Ticker symbol failed validation.
    #[error("Invalid ticker: '{ticker}'")]
    InvalidTicker {
        /// The rejected ticker.
        ticker: String,
    },

    /// Requested portfolio does not exist.
    #[error("Portfolio not found: {id}")]
    NotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// The backing portfolio source failed.
    #[error("Portfolio source error: {reason}")]
    Source {
        /// Description of the failure.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid portfolio error.
    #[must_use]
    pub fn invalid_portfolio(reason: impl Into<String>) -> Self {
        Self::InvalidPortfolio {
            reason: reason.into(),
        }
    }

    /// Creates an invalid ticker error.
    #[must_use]
    pub fn invalid_ticker(ticker: impl Into<String>) -> Self {
        Self::InvalidTicker {
            ticker: ticker.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a source error.
    #[must_use]
    pub fn source(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }
}
