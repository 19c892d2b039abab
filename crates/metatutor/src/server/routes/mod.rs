//! API routes for the metatutor server

pub mod feedback;
pub mod metrics;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::handle_query))
        .route("/feedback", post(feedback::submit_feedback))
        .route("/metrics/feedback", get(metrics::feedback_metrics))
        .route("/metrics/:model", get(metrics::classifier_metrics))
}
