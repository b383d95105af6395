//! # Folio Server
//!
//! REST server for the Folio portfolio risk engine.
//!
//! ## Features
//!
//! - Portfolio CRUD backed by an in-memory store
//! - Monte Carlo simulation and risk parity endpoints
//! - Uniform JSON error envelope
//! - Configuration via TOML file
//!
//! ## Usage
//!
//! ```ignore
//! use folio_server::{Server, ServerConfig};
//!
//! let server = Server::new(ServerConfig::default())?;
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use folio_core::CoreResult;

pub use config::ServerConfig;
pub use error::ApiError;
pub use store::InMemoryPortfolioStore;

/// The Folio server.
pub struct Server {
    config: ServerConfig,
    store: Arc<InMemoryPortfolioStore>,
}

impl Server {
    /// Create a new server, seeding the store from `portfolios_file` if set.
    pub fn new(config: ServerConfig) -> CoreResult<Self> {
        let store = match &config.portfolios_file {
            Some(path) => InMemoryPortfolioStore::load_json_file(path)?,
            None => InMemoryPortfolioStore::new(),
        };
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<InMemoryPortfolioStore>) -> Self {
        Self { config, store }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router_with_store(self.config.engine.clone(), self.store.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config.host.parse().unwrap_or([0, 0, 0, 0].into()),
            self.config.port,
        );

        info!("Starting Folio server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}
