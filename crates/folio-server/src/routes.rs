//! Route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use folio_risk::EngineConfig;

use crate::handlers::{self, AppState};
use crate::store::InMemoryPortfolioStore;

/// Create the API router with an empty portfolio store.
pub fn create_router(engine: EngineConfig) -> Router {
    create_router_with_store(engine, Arc::new(InMemoryPortfolioStore::new()))
}

/// Create the API router over an existing portfolio store.
///
/// # Arguments
/// * `engine` - Engine limits and solver settings
/// * `portfolio_store` - The portfolio store for CRUD and engine lookups
pub fn create_router_with_store(
    engine: EngineConfig,
    portfolio_store: Arc<InMemoryPortfolioStore>,
) -> Router {
    let state = Arc::new(AppState {
        engine,
        portfolio_store,
    });

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/api/v1/health", get(handlers::health))
        // Portfolio CRUD
        .route(
            "/api/v1/portfolios",
            get(handlers::list_portfolios).post(handlers::create_portfolio),
        )
        .route(
            "/api/v1/portfolios/:portfolio_id",
            get(handlers::get_portfolio)
                .put(handlers::update_portfolio)
                .delete(handlers::delete_portfolio),
        )
        // Engine operations
        .route("/api/v1/monte-carlo/simulate", post(handlers::simulate))
        .route(
            "/api/v1/optimization/risk-parity",
            post(handlers::risk_parity),
        )
        .with_state(state)
}
