//! Answer engines and the common engine capability interface

pub mod calculator;
pub mod generative;
pub mod lexical;
pub mod rule;
pub mod semantic;

pub use calculator::CalculatorEngine;
pub use generative::GenerativeEngine;
pub use lexical::{LexicalEngine, LexicalMatch};
pub use rule::{RuleEngine, RuleReason};
pub use semantic::{SemanticEngine, SemanticMatch};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Engine identity tags, as reported in responses and feedback records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineKind {
    Rule,
    Calculator,
    LexicalRetrieval,
    SemanticRetrieval,
    Generative,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineKind::Rule => "RULE",
            EngineKind::Calculator => "CALCULATOR",
            EngineKind::LexicalRetrieval => "LEXICAL_RETRIEVAL",
            EngineKind::SemanticRetrieval => "SEMANTIC_RETRIEVAL",
            EngineKind::Generative => "GENERATIVE",
        };
        f.write_str(name)
    }
}

/// A candidate answer produced by an engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    /// Answer text
    pub answer: String,
    /// Engine self-reported confidence in [0, 1]. Not comparable across
    /// engines; the generative engine pins this to 1.0 without calibration.
    pub confidence: f32,
    /// Origin tag for the answer (corpus category, "calculator", ...)
    pub source: Option<String>,
}

impl EngineResponse {
    /// An engine's "cannot answer" response. Engines absorb their own
    /// failures and return this instead of erroring.
    pub fn unsupported(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            confidence: 0.0,
            source: None,
        }
    }
}

/// Common capability every answer engine implements.
///
/// `answer` must always return: an engine that cannot handle the query
/// responds with a low-confidence placeholder rather than failing.
#[async_trait]
pub trait Engine: Send + Sync {
    /// The engine's identity tag
    fn kind(&self) -> EngineKind;

    /// Produce a candidate answer for the query
    async fn answer(&self, query: &str) -> EngineResponse;
}

/// Registry of dispatchable engines, keyed by identity tag.
///
/// Adding an engine means inserting it here; the controller selects by tag
/// and invokes through the common interface.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<EngineKind, Arc<dyn Engine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine under its own kind
    pub fn register(&mut self, engine: Arc<dyn Engine>) {
        self.engines.insert(engine.kind(), engine);
    }

    /// Look up an engine by tag
    pub fn get(&self, kind: EngineKind) -> Option<&Arc<dyn Engine>> {
        self.engines.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(EngineKind, &'static str);

    #[async_trait]
    impl Engine for FixedEngine {
        fn kind(&self) -> EngineKind {
            self.0
        }

        async fn answer(&self, _query: &str) -> EngineResponse {
            EngineResponse {
                answer: self.1.to_string(),
                confidence: 1.0,
                source: None,
            }
        }
    }

    #[tokio::test]
    async fn registry_dispatches_by_kind() {
        let mut registry = EngineRegistry::new();
        registry.register(Arc::new(FixedEngine(EngineKind::Calculator, "42")));
        registry.register(Arc::new(FixedEngine(EngineKind::Generative, "because")));

        let calc = registry.get(EngineKind::Calculator).unwrap();
        assert_eq!(calc.answer("x").await.answer, "42");
        assert!(registry.get(EngineKind::Rule).is_none());
    }

    #[test]
    fn kind_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&EngineKind::LexicalRetrieval).unwrap(),
            "\"LEXICAL_RETRIEVAL\""
        );
        assert_eq!(EngineKind::Calculator.to_string(), "CALCULATOR");
    }
}
