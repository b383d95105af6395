//! Portfolio type and its builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PortfolioId, Ticker};
use crate::error::{CoreError, CoreResult};

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-4;

/// A validated investment portfolio.
///
/// Holds ticker -> weight allocations that are each in `[0, 1]` and sum to 1
/// within [`WEIGHT_SUM_TOLERANCE`]. The value is immutable: every way of
/// obtaining one (builder, update, deserialization) runs the same validation.
///
/// Assets are kept in ticker order. Every vector the engine derives from a
/// portfolio ([`Portfolio::tickers`], [`Portfolio::weights`]) uses that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PortfolioRecord", rename_all = "camelCase")]
pub struct Portfolio {
    id: PortfolioId,
    name: String,
    description: String,
    assets: BTreeMap<Ticker, f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Creates a validated portfolio with a fresh ID and timestamps.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        assets: BTreeMap<Ticker, f64>,
    ) -> CoreResult<Self> {
        let now = Utc::now();
        Self::from_parts(
            PortfolioId::generate(),
            name.into(),
            description.into(),
            assets,
            now,
            now,
        )
    }

    fn from_parts(
        id: PortfolioId,
        name: String,
        description: String,
        assets: BTreeMap<Ticker, f64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if name.trim().is_empty() {
            return Err(CoreError::invalid_portfolio("Name is required"));
        }
        validate_assets(&assets)?;

        Ok(Self {
            id,
            name,
            description,
            assets,
            created_at,
            updated_at,
        })
    }

    /// Returns the portfolio identifier.
    pub fn id(&self) -> &PortfolioId {
        &self.id
    }

    /// Returns the portfolio name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the ticker -> weight allocation.
    pub fn assets(&self) -> &BTreeMap<Ticker, f64> {
        &self.assets
    }

    /// Returns the number of assets held.
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Returns the tickers in engine order.
    pub fn tickers(&self) -> Vec<Ticker> {
        self.assets.keys().cloned().collect()
    }

    /// Returns the weights in engine order.
    pub fn weights(&self) -> Vec<f64> {
        self.assets.values().copied().collect()
    }

    /// Returns the weight held in `ticker`, if any.
    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.assets.get(ticker).copied()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update, returning a new validated portfolio.
    ///
    /// The identifier and creation time are preserved; `updated_at` is
    /// refreshed.
    pub fn with_update(&self, update: PortfolioUpdate) -> CoreResult<Self> {
        if update.is_empty() {
            return Err(CoreError::invalid_portfolio(
                "At least one field (name, description, assets) is required",
            ));
        }

        Self::from_parts(
            self.id.clone(),
            update.name.unwrap_or_else(|| self.name.clone()),
            update
                .description
                .unwrap_or_else(|| self.description.clone()),
            update.assets.unwrap_or_else(|| self.assets.clone()),
            self.created_at,
            Utc::now().max(self.updated_at),
        )
    }
}

fn validate_assets(assets: &BTreeMap<Ticker, f64>) -> CoreResult<()> {
    if assets.is_empty() {
        return Err(CoreError::invalid_portfolio("Assets cannot be empty"));
    }

    for (ticker, &weight) in assets {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(CoreError::invalid_portfolio(format!(
                "Invalid weight for {}: {}",
                ticker, weight
            )));
        }
    }

    let total: f64 = assets.values().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(CoreError::invalid_portfolio(format!(
            "Asset weights must sum to 1.0, got {}",
            total
        )));
    }

    Ok(())
}

/// Wire form of a portfolio before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioRecord {
    #[serde(default)]
    id: Option<PortfolioId>,
    name: String,
    #[serde(default)]
    description: String,
    assets: BTreeMap<Ticker, f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PortfolioRecord> for Portfolio {
    type Error = CoreError;

    fn try_from(record: PortfolioRecord) -> Result<Self, Self::Error> {
        let now = Utc::now();
        let created_at = record.created_at.unwrap_or(now);
        Self::from_parts(
            record.id.unwrap_or_else(PortfolioId::generate),
            record.name,
            record.description,
            record.assets,
            created_at,
            record.updated_at.unwrap_or(created_at),
        )
    }
}

/// Partial update of a portfolio's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement allocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<BTreeMap<Ticker, f64>>,
}

impl PortfolioUpdate {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.assets.is_none()
    }
}

/// Builder for constructing a [`Portfolio`].
///
/// Ticker and weight problems are collected and reported by
/// [`PortfolioBuilder::build`].
///
/// # Example
///
/// ```rust
/// use folio_core::PortfolioBuilder;
///
/// let portfolio = PortfolioBuilder::new()
///     .id("PORT001")
///     .name("Sixty Forty")
///     .asset("SPY", 0.6)
///     .asset("AGG", 0.4)
///     .build()
///     .unwrap();
///
/// assert_eq!(portfolio.weights(), vec![0.4, 0.6]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortfolioBuilder {
    id: Option<String>,
    name: Option<String>,
    description: String,
    assets: Vec<(String, f64)>,
}

impl PortfolioBuilder {
    /// Creates a new portfolio builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the portfolio ID. A random one is generated otherwise.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the portfolio name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds an allocation.
    #[must_use]
    pub fn asset(mut self, ticker: impl Into<String>, weight: f64) -> Self {
        self.assets.push((ticker.into(), weight));
        self
    }

    /// Adds multiple allocations.
    #[must_use]
    pub fn assets<S: Into<String>>(mut self, assets: impl IntoIterator<Item = (S, f64)>) -> Self {
        self.assets
            .extend(assets.into_iter().map(|(t, w)| (t.into(), w)));
        self
    }

    /// Builds the portfolio, validating tickers and weights.
    pub fn build(self) -> CoreResult<Portfolio> {
        let mut assets = BTreeMap::new();
        for (symbol, weight) in self.assets {
            let ticker = Ticker::new(symbol)?;
            if assets.insert(ticker.clone(), weight).is_some() {
                return Err(CoreError::invalid_portfolio(format!(
                    "Duplicate ticker: {}",
                    ticker
                )));
            }
        }

        let now = Utc::now();
        let portfolio = Portfolio::from_parts(
            self.id.map_or_else(PortfolioId::generate, PortfolioId::new),
            self.name.unwrap_or_default(),
            self.description,
            assets,
            now,
            now,
        )?;

        log::debug!(
            "Built portfolio {} with {} assets",
            portfolio.id(),
            portfolio.num_assets()
        );
        Ok(portfolio)
    }
}
