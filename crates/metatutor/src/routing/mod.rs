//! Meta-controller: the query-routing decision pipeline
//!
//! Routing is a sequential pipeline: domain gate, safety gate, intent-driven
//! engine selection, engine invocation, and a post-hoc quality gate. Every
//! failure path resolves to a rule-engine fallback; `route` never errors for
//! a validated query.

pub mod validate;

pub use validate::validate;

use serde::Serialize;
use std::sync::Arc;

use crate::classify::{
    predict_difficulty, predict_risk, Classification, Difficulty, Risk, SharedBundle,
};
use crate::config::RoutingConfig;
use crate::engines::{
    EngineKind, EngineRegistry, EngineResponse, RuleEngine, RuleReason, SemanticEngine,
};
use crate::types::Query;

/// Classified intent of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Numeric,
    Factual,
    Explanation,
    Unsafe,
    Other(String),
}

impl Intent {
    fn from_label(label: &str) -> Self {
        match label {
            "NUMERIC" => Intent::Numeric,
            "FACTUAL" => Intent::Factual,
            "EXPLANATION" => Intent::Explanation,
            "UNSAFE" => Intent::Unsafe,
            other => Intent::Other(other.to_string()),
        }
    }
}

/// Ephemeral routing decision, logged for observability
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub domain: String,
    pub intent: String,
    pub difficulty: Difficulty,
    pub risk: Risk,
    pub chosen_engine: EngineKind,
}

/// The one record that crosses the system boundary
#[derive(Debug, Clone, Serialize)]
pub struct FinalResponse {
    pub answer: String,
    pub domain: String,
    pub intent: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub engine: EngineKind,
    pub confidence: f32,
    pub quality: Option<String>,
    pub source: Option<String>,
}

/// Orchestrates classification, engine selection, and gating
pub struct MetaController {
    bundle: SharedBundle,
    registry: EngineRegistry,
    semantic: Arc<SemanticEngine>,
    rule: RuleEngine,
    config: RoutingConfig,
    target_domain: String,
}

impl MetaController {
    pub fn new(
        bundle: SharedBundle,
        registry: EngineRegistry,
        semantic: Arc<SemanticEngine>,
        config: RoutingConfig,
        target_domain: String,
    ) -> Self {
        Self {
            bundle,
            registry,
            semantic,
            rule: RuleEngine::new(),
            config,
            target_domain,
        }
    }

    /// Route a validated query to a final response. Never fails: all failure
    /// paths resolve to a rule-engine fallback.
    pub async fn route(&self, query: &Query) -> FinalResponse {
        // One bundle snapshot per query: every classification and the lexical
        // index below come from the same version, so a concurrent hot-swap
        // can never be observed half-applied.
        let bundle = self.bundle.current();
        let text = query.as_str();

        let domain = bundle.domain.predict(text);
        if domain.label != self.target_domain {
            tracing::info!(domain = %domain.label, "Query outside target domain");
            let confidence = domain.confidence;
            return FinalResponse {
                answer: self.rule.respond(RuleReason::OutOfScope).answer,
                domain: domain.label,
                intent: None,
                difficulty: None,
                engine: EngineKind::Rule,
                confidence,
                quality: None,
                source: None,
            };
        }

        if let Some(term) = self.find_forbidden(text) {
            let intent = bundle.intent.predict(text);
            let confidence = mean_confidence(&domain, &intent);
            tracing::warn!(term = %term, "Query blocked by deny-list");
            return FinalResponse {
                answer: self.rule.respond(RuleReason::Forbidden).answer,
                domain: domain.label,
                intent: Some(intent.label),
                difficulty: None,
                engine: EngineKind::Rule,
                confidence,
                quality: None,
                source: None,
            };
        }

        let intent_result = bundle.intent.predict(text);
        let intent = Intent::from_label(&intent_result.label);
        let difficulty = predict_difficulty(text);
        let risk = predict_risk(text);
        let confidence = mean_confidence(&domain, &intent_result);

        if intent == Intent::Unsafe {
            // Fixed response, bypassing the risk and quality gates.
            return FinalResponse {
                answer: self.rule.respond(RuleReason::UnsafeQuery).answer,
                domain: domain.label,
                intent: Some(intent_result.label),
                difficulty: Some(difficulty),
                engine: EngineKind::Rule,
                confidence,
                quality: None,
                source: None,
            };
        }

        let (chosen, response) = self.select_and_invoke(&bundle, text, &intent, risk).await;

        let decision = RoutingDecision {
            domain: domain.label.clone(),
            intent: intent_result.label.clone(),
            difficulty,
            risk,
            chosen_engine: chosen,
        };
        tracing::debug!(decision = ?decision, "Routing decision");

        // Quality gate: classify the answer text; EXPLANATION answers are
        // exempt from structural validation but not from a RISKY label.
        let quality = bundle.quality.predict(&response.answer);
        let structurally_valid = validate(&response.answer) || intent == Intent::Explanation;
        if quality.label == "RISKY" || !structurally_valid {
            tracing::info!(
                engine = %chosen,
                quality = %quality.label,
                "Answer discarded by quality gate"
            );
            return FinalResponse {
                answer: self.rule.respond(RuleReason::ValidationFailed).answer,
                domain: domain.label,
                intent: Some(intent_result.label),
                difficulty: Some(difficulty),
                engine: chosen,
                confidence,
                quality: Some(quality.label),
                source: None,
            };
        }

        FinalResponse {
            answer: response.answer,
            domain: domain.label,
            intent: Some(intent_result.label),
            difficulty: Some(difficulty),
            engine: chosen,
            confidence,
            quality: Some(quality.label),
            source: response.source,
        }
    }

    /// Intent-driven engine selection with numeric-keyword override,
    /// followed by invocation of the selected engine.
    async fn select_and_invoke(
        &self,
        bundle: &crate::classify::ClassifierBundle,
        text: &str,
        intent: &Intent,
        risk: Risk,
    ) -> (EngineKind, EngineResponse) {
        if *intent == Intent::Numeric || self.has_numeric_trigger(text) {
            return (
                EngineKind::Calculator,
                self.dispatch(EngineKind::Calculator, text).await,
            );
        }

        match intent {
            Intent::Factual => {
                // Retrieval-first: semantic, then lexical, then generative.
                match self.semantic.nearest(text).await {
                    Ok(found) if found.score < self.config.semantic_score_ceiling => {
                        tracing::debug!(score = found.score, "Semantic match accepted");
                        return (
                            EngineKind::SemanticRetrieval,
                            EngineResponse {
                                answer: found.text,
                                confidence: 1.0 / (1.0 + found.score.max(0.0)),
                                source: found.source,
                            },
                        );
                    }
                    Ok(found) => {
                        tracing::debug!(score = found.score, "Semantic match rejected");
                    }
                    Err(e) => {
                        tracing::warn!("Semantic retrieval unavailable: {}", e);
                    }
                }

                let lexical = bundle.lexical.retrieve(text);
                if lexical.source.is_some() && lexical.similarity >= self.config.lexical_accept {
                    return (
                        EngineKind::LexicalRetrieval,
                        EngineResponse {
                            answer: lexical.answer,
                            confidence: lexical.similarity,
                            source: lexical.source,
                        },
                    );
                }

                // No grounded answer. Never let ungrounded generation stand
                // in for a high-risk factual query.
                if risk == Risk::HighRisk {
                    return (EngineKind::Rule, self.rule.respond(RuleReason::HighRisk));
                }

                (
                    EngineKind::Generative,
                    self.dispatch(EngineKind::Generative, text).await,
                )
            }
            Intent::Explanation => (
                EngineKind::Generative,
                self.dispatch(EngineKind::Generative, text).await,
            ),
            Intent::Other(label) => {
                tracing::info!(intent = %label, "Unrecognized intent");
                (EngineKind::Rule, self.rule.respond(RuleReason::UnknownIntent))
            }
            // Numeric handled by the override above; Unsafe short-circuits
            // before selection.
            Intent::Numeric | Intent::Unsafe => {
                (EngineKind::Rule, self.rule.respond(RuleReason::UnknownIntent))
            }
        }
    }

    /// Invoke a registered engine through the common interface
    async fn dispatch(&self, kind: EngineKind, text: &str) -> EngineResponse {
        match self.registry.get(kind) {
            Some(engine) => engine.answer(text).await,
            None => {
                tracing::error!(engine = %kind, "Engine not registered");
                self.rule.respond(RuleReason::ValidationFailed)
            }
        }
    }

    /// First deny-list term contained in the query (case-insensitive
    /// substring match)
    fn find_forbidden(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.config
            .deny_list
            .iter()
            .find(|term| lower.contains(&term.to_lowercase()))
            .map(|s| s.as_str())
    }

    /// Whether any arithmetic trigger term appears as a whole word
    fn has_numeric_trigger(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        self.config
            .numeric_triggers
            .iter()
            .any(|term| words.iter().any(|w| w == &term.to_lowercase().as_str()))
    }
}

fn mean_confidence(domain: &Classification, intent: &Classification) -> f32 {
    ((domain.confidence + intent.confidence) / 2.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::classify::testing::{kb_entry, keyword_bundle};
    use crate::classify::ClassifierBundle;
    use crate::engines::rule::CANNOT_ANSWER_TEXT;
    use crate::engines::semantic::VectorRecord;
    use crate::engines::{CalculatorEngine, Engine, GenerativeEngine};
    use crate::error::Result;
    use crate::providers::{EmbeddingProvider, GenerativeProvider};

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

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

    fn record(text: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: "1".to_string(),
            text: text.to_string(),
            metadata: HashMap::from([(
                "category".to_string(),
                serde_json::Value::String("academics".to_string()),
            )]),
            embedding,
        }
    }

    fn default_bundle() -> ClassifierBundle {
        keyword_bundle(
            &[("stocks", "FINANCE")],
            &[
                ("explain", "EXPLANATION"),
                ("danger", "UNSAFE"),
                ("gibberish", "CHITCHAT"),
            ],
            &[("hazard", "RISKY")],
            vec![kb_entry(
                "what is the grading system",
                "Grades run from A to F on a 10-point scale.",
                Some("academics"),
            )],
        )
    }

    struct Setup {
        semantic_records: Vec<VectorRecord>,
        query_embedding: Vec<f32>,
        generated: &'static str,
        bundle: ClassifierBundle,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                semantic_records: vec![],
                query_embedding: vec![0.0, 0.0],
                generated: "Here is a short explanation of the topic.",
                bundle: default_bundle(),
            }
        }
    }

    impl Setup {
        fn build(self) -> (MetaController, SharedBundle) {
            let shared = SharedBundle::new(self.bundle);

            let mut registry = EngineRegistry::new();
            registry.register(std::sync::Arc::new(CalculatorEngine::new()));
            registry.register(std::sync::Arc::new(GenerativeEngine::new(
                std::sync::Arc::new(FixedGenerator(self.generated)),
            )));

            let semantic = std::sync::Arc::new(SemanticEngine::from_records(
                self.semantic_records,
                std::sync::Arc::new(FixedEmbedder(self.query_embedding)),
            ));

            let controller = MetaController::new(
                shared.clone(),
                registry,
                semantic,
                RoutingConfig::default(),
                "STUDENT".to_string(),
            );
            (controller, shared)
        }
    }

    fn query(text: &str) -> Query {
        Query::parse(text).unwrap()
    }

    #[tokio::test]
    async fn out_of_scope_short_circuits_to_rule_with_null_fields() {
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("tell me about stocks")).await;

        assert_eq!(response.engine, EngineKind::Rule);
        assert_eq!(response.domain, "FINANCE");
        assert!(response.intent.is_none());
        assert!(response.difficulty.is_none());
    }

    #[tokio::test]
    async fn forbidden_term_is_blocked_regardless_of_intent() {
        let (controller, _) = Setup::default().build();
        for text in ["how to cheat on the final", "explain how to cheat"] {
            let response = controller.route(&query(text)).await;
            assert_eq!(response.engine, EngineKind::Rule);
            assert_eq!(
                response.answer,
                "This query contains blocked terms and cannot be answered."
            );
        }
    }

    #[tokio::test]
    async fn numeric_trigger_overrides_intent() {
        // Intent classifies as FACTUAL (default), but "multiply" forces the
        // calculator.
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("multiply 3 and 4")).await;

        assert_eq!(response.engine, EngineKind::Calculator);
        assert_eq!(response.answer, "12.0");
        assert_eq!(response.source.as_deref(), Some("calculator"));
    }

    #[tokio::test]
    async fn factual_query_prefers_accepted_semantic_match() {
        let setup = Setup {
            semantic_records: vec![record("Semesters are 16 weeks long.", vec![0.1, 0.0])],
            query_embedding: vec![0.0, 0.0],
            ..Setup::default()
        };
        let (controller, _) = setup.build();
        let response = controller.route(&query("how long is a semester")).await;

        assert_eq!(response.engine, EngineKind::SemanticRetrieval);
        assert_eq!(response.answer, "Semesters are 16 weeks long.");
        assert_eq!(response.source.as_deref(), Some("academics"));
    }

    #[tokio::test]
    async fn factual_query_falls_back_to_lexical_when_semantic_is_far() {
        let setup = Setup {
            // Distance 100 >> ceiling 5.0
            semantic_records: vec![record("irrelevant", vec![10.0, 0.0])],
            query_embedding: vec![0.0, 0.0],
            ..Setup::default()
        };
        let (controller, _) = setup.build();
        let response = controller.route(&query("what is the grading system")).await;

        assert_eq!(response.engine, EngineKind::LexicalRetrieval);
        assert_eq!(response.answer, "Grades run from A to F on a 10-point scale.");
    }

    #[tokio::test]
    async fn factual_query_falls_back_to_generative_when_retrieval_rejects() {
        let (controller, _) = Setup {
            generated: "It depends on the course catalog for your program.",
            ..Setup::default()
        }
        .build();
        let response = controller.route(&query("what electives can I pick")).await;

        assert_eq!(response.engine, EngineKind::Generative);
        assert_eq!(
            response.answer,
            "It depends on the course catalog for your program."
        );
    }

    #[tokio::test]
    async fn high_risk_factual_query_never_gets_ungrounded_generation() {
        let (controller, _) = Setup::default().build();
        // "who" prefix -> HIGH_RISK; retrieval has nothing for it.
        let response = controller.route(&query("who runs the hostel mess")).await;

        assert_eq!(response.engine, EngineKind::Rule);
        assert_eq!(
            response.answer,
            "I cannot answer this reliably, so I'd rather not guess."
        );
    }

    #[tokio::test]
    async fn explanation_intent_goes_straight_to_generative() {
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("explain recursion to me")).await;

        assert_eq!(response.engine, EngineKind::Generative);
    }

    #[tokio::test]
    async fn unsafe_intent_bypasses_quality_gate() {
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("danger zone request")).await;

        assert_eq!(response.engine, EngineKind::Rule);
        assert_eq!(
            response.answer,
            "This query was flagged as unsafe and cannot be answered."
        );
        assert!(response.quality.is_none());
    }

    #[tokio::test]
    async fn unknown_intent_gets_fixed_rule_message() {
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("gibberish request")).await;

        assert_eq!(response.engine, EngineKind::Rule);
        assert_eq!(
            response.answer,
            "I'm not sure what you are asking. Could you rephrase your question?"
        );
    }

    #[tokio::test]
    async fn risky_quality_label_discards_the_answer() {
        let (controller, _) = Setup {
            generated: "hazard hazard hazard",
            ..Setup::default()
        }
        .build();
        let response = controller.route(&query("what should I do tonight")).await;

        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
        assert_eq!(response.quality.as_deref(), Some("RISKY"));
        // Engine name preserved for observability.
        assert_eq!(response.engine, EngineKind::Generative);
    }

    #[tokio::test]
    async fn invalid_answer_is_discarded_unless_explanation() {
        // The calculator's unsupported placeholder fails validation.
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("multiply 3")).await;
        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
        assert_eq!(response.engine, EngineKind::Calculator);

        // The same placeholder text survives under EXPLANATION intent.
        let (controller, _) = Setup {
            generated: "Calculation not supported.",
            ..Setup::default()
        }
        .build();
        let response = controller.route(&query("explain this thing")).await;
        assert_eq!(response.answer, "Calculation not supported.");
    }

    #[tokio::test]
    async fn confidence_is_mean_of_domain_and_intent_rounded() {
        let (controller, _) = Setup::default().build();
        let response = controller.route(&query("explain recursion to me")).await;

        assert!(response.confidence >= 0.0 && response.confidence <= 1.0);
        let rescaled = response.confidence * 100.0;
        assert!((rescaled - rescaled.round()).abs() < 1e-4);
    }

    #[tokio::test]
    async fn hot_swap_is_visible_between_queries_but_never_torn() {
        let (controller, shared) = Setup::default().build();

        let before = controller.route(&query("tell me about stocks")).await;
        assert_eq!(before.domain, "FINANCE");

        // New bundle maps everything (including "stocks") into scope.
        shared.replace(keyword_bundle(
            &[],
            &[("stocks", "EXPLANATION")],
            &[],
            vec![],
        ));

        let after = controller.route(&query("tell me about stocks")).await;
        assert_eq!(after.domain, "STUDENT");
        assert_eq!(after.intent.as_deref(), Some("EXPLANATION"));
        assert_eq!(after.engine, EngineKind::Generative);
    }
}
