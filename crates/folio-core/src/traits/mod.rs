//! Core traits for the Folio library.
//!
//! - [`PortfolioSource`]: lookup of validated portfolios by identifier

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Portfolio, PortfolioId};

/// Source of portfolios by identifier.
///
/// The engine never owns portfolios; it asks a source for one per request.
/// `Ok(None)` means the portfolio does not exist, while `Err` is reserved for
/// failures of the source itself.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Fetch a portfolio by ID.
    async fn fetch(&self, id: &PortfolioId) -> CoreResult<Option<Portfolio>>;

    /// Fetch a portfolio, turning a missing one into [`CoreError::NotFound`].
    ///
    /// [`CoreError::NotFound`]: crate::error::CoreError::NotFound
    async fn require(&self, id: &PortfolioId) -> CoreResult<Portfolio> {
        self.fetch(id)
            .await?
            .ok_or_else(|| crate::error::CoreError::not_found(id.as_str()))
    }
}
