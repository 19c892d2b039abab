//! Query endpoint: validate, route, and log the interaction

use axum::{extract::State, Json};

use crate::error::Result;
use crate::feedback::FeedbackRecord;
use crate::server::state::AppState;
use crate::types::{Query, QueryAnswer, QueryRequest};

/// POST /query - route a student query to an answer
pub async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryAnswer>> {
    let query = Query::parse(&request.query)?;

    tracing::info!("Query: \"{}\"", query);
    let response = state.controller().route(&query).await;

    // Log the interaction as an initial feedback row (feedback NULL).
    // A store failure must never block the response.
    let record = FeedbackRecord {
        query: query.as_str().to_string(),
        feedback: None,
        domain: Some(response.domain.clone()),
        intent: response.intent.clone(),
        engine: Some(response.engine.to_string()),
    };
    if let Err(e) = state.store().append(record) {
        tracing::error!("Feedback store error: {}", e);
    }

    tracing::info!(
        engine = %response.engine,
        confidence = response.confidence,
        "Query answered"
    );

    Ok(Json(QueryAnswer::from(response)))
}
