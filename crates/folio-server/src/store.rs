//! In-memory portfolio store.

use async_trait::async_trait;
use dashmap::DashMap;

use folio_core::{CoreError, CoreResult, Portfolio, PortfolioId, PortfolioSource};

/// Thread-safe in-memory portfolio store.
///
/// Backs the portfolio CRUD endpoints and serves as the engine's
/// [`PortfolioSource`].
#[derive(Debug, Default)]
pub struct InMemoryPortfolioStore {
    portfolios: DashMap<String, Portfolio>,
}

impl InMemoryPortfolioStore {
    /// Create a new empty in-memory portfolio store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a JSON array of portfolios.
    ///
    /// Every record goes through the same validation as API input.
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let portfolios: Vec<Portfolio> = serde_json::from_str(content)
            .map_err(|e| CoreError::source(format!("Failed to parse portfolios: {}", e)))?;

        let store = Self::new();
        for portfolio in portfolios {
            store.upsert(portfolio);
        }
        Ok(store)
    }

    /// Load a store from a JSON file of portfolios.
    pub fn load_json_file(path: &str) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::source(format!("Failed to read {}: {}", path, e)))?;
        let store = Self::from_json(&content)?;
        tracing::info!(path, count = store.len(), "loaded portfolios");
        Ok(store)
    }

    /// Insert or replace a portfolio.
    pub fn upsert(&self, portfolio: Portfolio) -> Portfolio {
        self.portfolios
            .insert(portfolio.id().to_string(), portfolio.clone());
        portfolio
    }

    /// Get a portfolio by ID.
    pub fn get(&self, portfolio_id: &str) -> Option<Portfolio> {
        self.portfolios.get(portfolio_id).map(|p| p.clone())
    }

    /// Delete a portfolio by ID.
    pub fn delete(&self, portfolio_id: &str) -> Option<Portfolio> {
        self.portfolios.remove(portfolio_id).map(|(_, p)| p)
    }

    /// List up to `limit` portfolios, ordered by ID.
    pub fn list(&self, limit: usize) -> Vec<Portfolio> {
        let mut results: Vec<Portfolio> =
            self.portfolios.iter().map(|r| r.value().clone()).collect();
        results.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
        results.truncate(limit);
        results
    }

    /// Number of stored portfolios.
    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }
}

#[async_trait]
impl PortfolioSource for InMemoryPortfolioStore {
    async fn fetch(&self, id: &PortfolioId) -> CoreResult<Option<Portfolio>> {
        Ok(self.get(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::PortfolioBuilder;

    fn portfolio(id: &str) -> Portfolio {
        PortfolioBuilder::new()
            .id(id)
            .name(format!("Portfolio {}", id))
            .asset("SPY", 0.6)
            .asset("AGG", 0.4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_crud() {
        let store = InMemoryPortfolioStore::new();
        assert!(store.is_empty());

        store.upsert(portfolio("b"));
        store.upsert(portfolio("a"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().name(), "Portfolio a");

        let ids: Vec<String> = store.list(10).iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.list(1).len(), 1);

        assert!(store.delete("a").is_some());
        assert!(store.delete("a").is_none());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_from_json_validates() {
        let store = InMemoryPortfolioStore::from_json(
            r#"[{"id": "p1", "name": "One", "assets": {"SPY": 1.0}}]"#,
        )
        .unwrap();
        assert_eq!(store.get("p1").unwrap().weights(), vec![1.0]);

        let err = InMemoryPortfolioStore::from_json(
            r#"[{"id": "p2", "name": "Bad", "assets": {"SPY": 0.5}}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Source { .. }));
    }

    #[tokio::test]
    async fn test_portfolio_source() {
        let store = InMemoryPortfolioStore::new();
        store.upsert(portfolio("p1"));

        let found = store.require(&PortfolioId::new("p1")).await.unwrap();
        assert_eq!(found.id().as_str(), "p1");

        let err = store.require(&PortfolioId::new("missing")).await.unwrap_err();
        assert_eq!(err, CoreError::not_found("missing"));
    }
}
