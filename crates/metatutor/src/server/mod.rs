//! HTTP server for the metatutor service

pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::Result;
use state::AppState;

/// Metatutor HTTP server
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new server, loading all model artifacts
    pub async fn new(config: AppConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health_check))
            .merge(routes::api_routes())
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.server.max_body_size))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting metatutor server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Liveness endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "Backend running" }))
}
