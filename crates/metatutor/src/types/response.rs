//! HTTP response payloads

use serde::{Deserialize, Serialize};

use crate::classify::Difficulty;
use crate::engines::EngineKind;
use crate::routing::FinalResponse;

/// POST /query response body
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    /// The answer text surfaced to the student
    pub answer: String,
    /// Classified domain label
    pub domain: String,
    /// Classified intent label (absent for out-of-scope queries)
    pub intent: Option<String>,
    /// Heuristic difficulty bucket (absent for out-of-scope queries)
    pub difficulty: Option<Difficulty>,
    /// Engine that produced (or was selected for) the answer
    pub engine_used: EngineKind,
    /// Mean of domain and intent classifier confidence, rounded to 2 decimals
    pub confidence: f32,
    /// Human-readable routing summary
    pub reason: String,
}

impl From<FinalResponse> for QueryAnswer {
    fn from(response: FinalResponse) -> Self {
        let reason = format!(
            "{} {} query routed to {} engine",
            response.domain,
            response.intent.as_deref().unwrap_or("UNCLASSIFIED"),
            response.engine
        );
        Self {
            answer: response.answer,
            domain: response.domain,
            intent: response.intent,
            difficulty: response.difficulty,
            engine_used: response.engine,
            confidence: response.confidence,
            reason,
        }
    }
}

/// POST /feedback request body
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    /// The query the feedback refers to
    pub query: String,
    /// Engine reported to the user for that query
    pub engine_used: String,
    /// 1 = helpful, 0 = not helpful
    pub feedback: i64,
}

/// Generic status response body
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
