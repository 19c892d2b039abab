//! Feedback endpoint: persist the record and schedule retraining

use axum::{extract::State, Json};

use crate::error::Result;
use crate::feedback::FeedbackRecord;
use crate::server::state::AppState;
use crate::types::{FeedbackRequest, StatusResponse};

/// POST /feedback - store user feedback and schedule retraining.
///
/// The response does not wait on retraining: the record is persisted, a
/// retraining run is requested fire-and-forget, and the endpoint returns.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<StatusResponse>> {
    state.store().append(FeedbackRecord {
        query: request.query,
        feedback: Some(request.feedback),
        domain: None,
        intent: None,
        engine: Some(request.engine_used),
    })?;

    let signal = state.retrain().request();
    tracing::info!(signal = ?signal, "Feedback stored, retraining requested");

    Ok(Json(StatusResponse::success()))
}
