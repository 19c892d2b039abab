//! Generative engine: black-box bounded text generation

use async_trait::async_trait;
use std::sync::Arc;

use crate::providers::GenerativeProvider;

use super::rule::CANNOT_ANSWER_TEXT;
use super::{Engine, EngineKind, EngineResponse};

/// Wraps a generative provider behind the engine interface.
///
/// The generator does not expose calibrated confidence, so every successful
/// answer reports 1.0; callers must not treat that as a probability. Provider
/// failure is absorbed into a cannot-answer response.
pub struct GenerativeEngine {
    provider: Arc<dyn GenerativeProvider>,
}

impl GenerativeEngine {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Engine for GenerativeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Generative
    }

    async fn answer(&self, query: &str) -> EngineResponse {
        match self.provider.generate(query).await {
            Ok(text) if !text.trim().is_empty() => EngineResponse {
                answer: text,
                confidence: 1.0,
                source: Some("generative".to_string()),
            },
            Ok(_) => EngineResponse::unsupported(CANNOT_ANSWER_TEXT),
            Err(e) => {
                tracing::warn!("Generation failed ({}): {}", self.provider.name(), e);
                EngineResponse::unsupported(CANNOT_ANSWER_TEXT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl GenerativeProvider for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl GenerativeProvider for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::Llm("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn successful_generation_reports_pinned_confidence() {
        let engine = GenerativeEngine::new(Arc::new(FixedGenerator(
            "A GPA is a weighted average of your grades.",
        )));
        let response = engine.answer("explain gpa").await;
        assert_eq!(response.confidence, 1.0);
        assert_eq!(response.source.as_deref(), Some("generative"));
    }

    #[tokio::test]
    async fn provider_failure_is_absorbed() {
        let engine = GenerativeEngine::new(Arc::new(FailingGenerator));
        let response = engine.answer("explain gpa").await;
        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
        assert_eq!(response.confidence, 0.0);
        assert!(response.source.is_none());
    }

    #[tokio::test]
    async fn empty_generation_is_unsupported() {
        let engine = GenerativeEngine::new(Arc::new(FixedGenerator("   ")));
        let response = engine.answer("explain gpa").await;
        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
    }
}
