//! Identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Maximum length of a ticker symbol.
pub const MAX_TICKER_LEN: usize = 10;

/// Asset ticker symbol.
///
/// Tickers are non-empty and at most [`MAX_TICKER_LEN`] characters. They
/// order lexicographically, which is the asset ordering used by the engine.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Creates a validated ticker.
    pub fn new(symbol: impl Into<String>) -> CoreResult<Self> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() || symbol.chars().count() > MAX_TICKER_LEN {
            return Err(CoreError::invalid_ticker(symbol));
        }
        Ok(Self(symbol))
    }

    /// Get the ticker as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl std::borrow::Borrow<str> for Ticker {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Portfolio identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioId(pub String);

impl PortfolioId {
    /// Create a new portfolio ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random (v4 UUID) portfolio ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PortfolioId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PortfolioId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
