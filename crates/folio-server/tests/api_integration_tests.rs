//! Integration tests for the Folio Server API endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_core::PortfolioBuilder;
use folio_risk::EngineConfig;
use folio_server::routes::{create_router, create_router_with_store};
use folio_server::InMemoryPortfolioStore;

/// Router over a store holding one balanced portfolio with ID `balanced`.
fn create_test_app() -> (Router, Arc<InMemoryPortfolioStore>) {
    let store = Arc::new(InMemoryPortfolioStore::new());
    store.upsert(
        PortfolioBuilder::new()
            .id("balanced")
            .name("Balanced")
            .asset("SPY", 0.5)
            .asset("AGG", 0.3)
            .asset("GLD", 0.2)
            .build()
            .unwrap(),
    );
    (
        create_router_with_store(EngineConfig::default(), store.clone()),
        store,
    )
}

fn monthly_returns() -> Value {
    json!({
        "SPY": [0.021, -0.034, 0.042, 0.011, -0.008, 0.027, 0.015, -0.022, 0.031, 0.009, -0.013, 0.018],
        "AGG": [0.004, 0.006, -0.003, 0.002, 0.005, -0.001, 0.003, 0.004, -0.002, 0.001, 0.006, 0.002],
        "GLD": [-0.012, 0.025, 0.008, -0.017, 0.014, 0.003, -0.006, 0.019, -0.004, 0.011, 0.007, -0.009]
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_router(EngineConfig::default());
    let (status, body) = send(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// PORTFOLIO CRUD
// =============================================================================

#[tokio::test]
async fn test_create_and_get_portfolio() {
    let (app, store) = create_test_app();
    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/v1/portfolios",
        Some(json!({
            "name": "Sixty Forty",
            "description": "Classic allocation",
            "assets": {"SPY": 0.6, "AGG": 0.4}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["assets"]["SPY"], 0.6);
    assert!(created["createdAt"].is_string());
    assert_eq!(store.len(), 2);

    let (status, fetched) = send(app, "GET", &format!("/api/v1/portfolios/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Sixty Forty");
}

#[tokio::test]
async fn test_create_rejects_bad_weights() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/portfolios",
        Some(json!({"name": "Bad", "assets": {"SPY": 0.6, "AGG": 0.3}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("sum to 1.0"));
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let (app, _) = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/portfolios")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_missing_portfolio() {
    let (app, _) = create_test_app();
    let (status, body) = send(app, "GET", "/api/v1/portfolios/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_portfolios_with_limit() {
    let (app, store) = create_test_app();
    store.upsert(
        PortfolioBuilder::new()
            .id("another")
            .name("Another")
            .asset("QQQ", 1.0)
            .build()
            .unwrap(),
    );

    let (status, all) = send(app.clone(), "GET", "/api/v1/portfolios", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["id"], "another");

    let (_, limited) = send(app, "GET", "/api/v1/portfolios?limit=1", None).await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_portfolio() {
    let (app, store) = create_test_app();
    let (status, updated) = send(
        app.clone(),
        "PUT",
        "/api/v1/portfolios/balanced",
        Some(json!({"name": "Renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["assets"]["SPY"], 0.5);
    assert_eq!(store.get("balanced").unwrap().name(), "Renamed");

    let (status, body) = send(app, "PUT", "/api/v1/portfolios/balanced", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_portfolio() {
    let (app, store) = create_test_app();
    let (status, _) = send(app.clone(), "DELETE", "/api/v1/portfolios/balanced", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.is_empty());

    let (status, _) = send(app, "DELETE", "/api/v1/portfolios/balanced", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// MONTE CARLO
// =============================================================================

#[tokio::test]
async fn test_simulate() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/monte-carlo/simulate",
        Some(json!({
            "portfolioId": "balanced",
            "numSimulations": 50,
            "numPeriods": 12,
            "seed": 7,
            "returns": monthly_returns()
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["portfolioId"], "balanced");
    assert_eq!(body["parameters"]["initialInvestment"], 10_000.0);
    assert_eq!(body["parameters"]["seed"], 7);

    let trajectories = body["result"]["trajectories"].as_array().unwrap();
    assert_eq!(trajectories.len(), 50);
    assert_eq!(trajectories[0].as_array().unwrap().len(), 13);
    assert_eq!(trajectories[0][0], 10_000.0);

    let percentiles = &body["result"]["statistics"]["percentiles"];
    for key in ["5", "25", "50", "75", "95"] {
        assert!(percentiles[key].is_number());
    }
}

#[tokio::test]
async fn test_simulate_missing_portfolio() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/monte-carlo/simulate",
        Some(json!({"portfolioId": "ghost", "returns": monthly_returns()})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_simulate_validation_details() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/monte-carlo/simulate",
        Some(json!({
            "portfolioId": "balanced",
            "numSimulations": 0,
            "numPeriods": -3,
            "returns": monthly_returns()
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_simulate_missing_returns() {
    let (app, _) = create_test_app();
    let mut returns = monthly_returns();
    returns.as_object_mut().unwrap().remove("GLD");

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/monte-carlo/simulate",
        Some(json!({"portfolioId": "balanced", "numSimulations": 10, "returns": returns})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("GLD"));
}

// =============================================================================
// RISK PARITY
// =============================================================================

#[tokio::test]
async fn test_risk_parity() {
    let (app, _) = create_test_app();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/optimization/risk-parity",
        Some(json!({"portfolioId": "balanced", "returns": monthly_returns()})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "risk-parity");
    assert_eq!(body["parameters"]["method"], "SPG");
    assert_eq!(body["parameters"]["maxIterations"], 1000);

    let weights = body["result"]["weights"].as_object().unwrap();
    assert_eq!(weights.len(), 3);
    let total: f64 = weights.values().map(|w| w.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(body["result"]["metrics"]["portfolioVolatility"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_risk_parity_degenerate_covariance() {
    let (app, store) = create_test_app();
    store.upsert(
        PortfolioBuilder::new()
            .id("twins")
            .name("Twins")
            .asset("A", 0.5)
            .asset("B", 0.5)
            .build()
            .unwrap(),
    );
    let series = json!([0.01, -0.02, 0.015, 0.004]);

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/optimization/risk-parity",
        Some(json!({"portfolioId": "twins", "returns": {"A": series, "B": series}})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "DEGENERATE_INPUT");
}
