//! Request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use folio_core::{
    CoreError, Portfolio, PortfolioBuilder, PortfolioId, PortfolioSource, PortfolioUpdate,
};
use folio_risk::prelude::*;

use crate::error::ApiError;
use crate::store::InMemoryPortfolioStore;

/// Application state.
pub struct AppState {
    /// Engine limits and solver settings
    pub engine: EngineConfig,
    /// Portfolio store (CRUD and engine lookups)
    pub portfolio_store: Arc<InMemoryPortfolioStore>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// PORTFOLIO CRUD
// =============================================================================

fn default_limit() -> usize {
    100
}

/// Query parameters for listing portfolios.
#[derive(Debug, Deserialize)]
pub struct PortfolioListQuery {
    /// Maximum number of results
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// List portfolios.
pub async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortfolioListQuery>,
) -> Json<Vec<Portfolio>> {
    Json(state.portfolio_store.list(query.limit))
}

/// Get a single portfolio by ID.
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Path(portfolio_id): Path<String>,
) -> Result<Json<Portfolio>, ApiError> {
    let portfolio = state
        .portfolio_store
        .require(&PortfolioId::new(portfolio_id))
        .await?;
    Ok(Json(portfolio))
}

/// Request for creating a portfolio.
#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    /// Portfolio name
    #[serde(default)]
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Ticker -> weight allocation
    #[serde(default)]
    pub assets: BTreeMap<String, f64>,
}

/// Create a new portfolio with a generated ID.
pub async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePortfolioRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let portfolio = PortfolioBuilder::new()
        .name(request.name)
        .description(request.description)
        .assets(request.assets)
        .build()?;

    tracing::info!(portfolio = %portfolio.id(), assets = portfolio.num_assets(), "portfolio created");
    let created = state.portfolio_store.upsert(portfolio);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a partial update to an existing portfolio.
pub async fn update_portfolio(
    State(state): State<Arc<AppState>>,
    Path(portfolio_id): Path<String>,
    payload: Result<Json<PortfolioUpdate>, JsonRejection>,
) -> Result<Json<Portfolio>, ApiError> {
    let Json(update) = payload?;
    let existing = state
        .portfolio_store
        .require(&PortfolioId::new(portfolio_id))
        .await?;
    let updated = state.portfolio_store.upsert(existing.with_update(update)?);
    Ok(Json(updated))
}

/// Delete a portfolio.
pub async fn delete_portfolio(
    State(state): State<Arc<AppState>>,
    Path(portfolio_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.portfolio_store.delete(&portfolio_id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(CoreError::not_found(portfolio_id).into()),
    }
}

// =============================================================================
// ENGINE OPERATIONS
// =============================================================================

/// Run a Monte Carlo simulation for a stored portfolio.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulationResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate(&state.engine)?;
    let portfolio = state
        .portfolio_store
        .require(&PortfolioId::new(request.portfolio_id.as_str()))
        .await?;

    let config = state.engine.clone();
    let response = tokio::task::spawn_blocking(move || {
        run_simulation(&portfolio, &request, &config)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Simulation task failed: {}", e)))??;

    Ok(Json(response))
}

/// Compute risk parity weights for a stored portfolio.
pub async fn risk_parity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OptimizationRequest>, JsonRejection>,
) -> Result<Json<OptimizationResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let portfolio = state
        .portfolio_store
        .require(&PortfolioId::new(request.portfolio_id.as_str()))
        .await?;

    let config = state.engine.clone();
    let response = tokio::task::spawn_blocking(move || {
        run_risk_parity(&portfolio, &request, &config)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Optimization task failed: {}", e)))??;

    Ok(Json(response))
}
