//! Rule engine: fixed natural-language responses keyed by reason code

use super::EngineResponse;

/// The shared cannot-answer text, also used by retrieval rejections
pub const CANNOT_ANSWER_TEXT: &str = "I'm sorry, I cannot confidently answer this question.";

/// Reason codes for rule responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleReason {
    /// Query classified outside the student domain
    OutOfScope,
    /// Query matched the forbidden-term deny-list
    Forbidden,
    /// Intent classified as UNSAFE
    UnsafeQuery,
    /// Intent label not recognized by the router
    UnknownIntent,
    /// High hallucination risk with no grounded answer available
    HighRisk,
    /// Engine answer discarded by the quality gate
    ValidationFailed,
}

/// Pure lookup from reason code to a fixed message.
///
/// Confidence on these responses is not meaningful; the controller overrides
/// it with classifier confidence before emitting a final response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fixed response for a reason code
    pub fn respond(&self, reason: RuleReason) -> EngineResponse {
        let answer = match reason {
            RuleReason::OutOfScope => {
                "This assistant only answers questions about student life and academics."
            }
            RuleReason::Forbidden => {
                "This query contains blocked terms and cannot be answered."
            }
            RuleReason::UnsafeQuery => {
                "This query was flagged as unsafe and cannot be answered."
            }
            RuleReason::UnknownIntent => {
                "I'm not sure what you are asking. Could you rephrase your question?"
            }
            RuleReason::HighRisk => {
                "I cannot answer this reliably, so I'd rather not guess."
            }
            RuleReason::ValidationFailed => CANNOT_ANSWER_TEXT,
        };

        EngineResponse {
            answer: answer.to_string(),
            confidence: 0.0,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_has_a_fixed_message() {
        let engine = RuleEngine::new();
        for reason in [
            RuleReason::OutOfScope,
            RuleReason::Forbidden,
            RuleReason::UnsafeQuery,
            RuleReason::UnknownIntent,
            RuleReason::HighRisk,
            RuleReason::ValidationFailed,
        ] {
            let response = engine.respond(reason);
            assert!(!response.answer.is_empty());
            assert_eq!(response.confidence, 0.0);
            assert!(response.source.is_none());
        }
    }

    #[test]
    fn validation_failure_uses_shared_cannot_answer_text() {
        let response = RuleEngine::new().respond(RuleReason::ValidationFailed);
        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
    }
}
