//! Semantic retrieval engine: nearest-neighbor search over a pre-built
//! embedding index
//!
//! The index is an offline artifact: one JSON record per line with the entry
//! text, metadata, and its embedding. The engine embeds the query through the
//! provider and scans for the nearest record by squared L2 distance.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::rule::CANNOT_ANSWER_TEXT;
use super::{Engine, EngineKind, EngineResponse};

/// One record of the pre-built vector index
#[derive(Debug, Clone, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub embedding: Vec<f32>,
}

/// Nearest-neighbor result for a query
#[derive(Debug, Clone)]
pub struct SemanticMatch {
    /// Matched record text
    pub text: String,
    /// Squared L2 distance; lower is better
    pub score: f32,
    /// Source tag derived from the record metadata
    pub source: Option<String>,
}

/// Embedding-based retrieval over the knowledge-base vector artifact
pub struct SemanticEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    records: Vec<VectorRecord>,
}

impl SemanticEngine {
    /// Load the vector artifact (one JSON record per line)
    pub fn load(path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::model("semantic", format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: VectorRecord = serde_json::from_str(line).map_err(|e| {
                Error::model(
                    "semantic",
                    format!("bad record at {}:{}: {}", path.display(), line_no + 1, e),
                )
            })?;
            if record.embedding.is_empty() {
                return Err(Error::model(
                    "semantic",
                    format!("record '{}' has no embedding", record.id),
                ));
            }
            records.push(record);
        }

        Ok(Self::from_records(records, embedder))
    }

    /// Build the engine from in-memory records
    pub fn from_records(
        records: Vec<VectorRecord>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self { embedder, records }
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the nearest record for the query.
    ///
    /// The raw distance score is surfaced so the caller can apply its own
    /// acceptance ceiling; this engine does not threshold.
    pub async fn nearest(&self, query: &str) -> Result<SemanticMatch> {
        if self.records.is_empty() {
            return Err(Error::Embedding("vector index is empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await?;

        let (best, score) = self
            .records
            .iter()
            .map(|record| (record, squared_l2(&query_embedding, &record.embedding)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .expect("index is non-empty");

        Ok(SemanticMatch {
            text: best.text.clone(),
            score,
            source: best
                .metadata
                .get("category")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

#[async_trait]
impl Engine for SemanticEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::SemanticRetrieval
    }

    async fn answer(&self, query: &str) -> EngineResponse {
        match self.nearest(query).await {
            Ok(found) => EngineResponse {
                answer: found.text,
                // Monotone map of distance into [0, 1] for the common
                // interface; the routed factual path uses the raw score.
                confidence: 1.0 / (1.0 + found.score.max(0.0)),
                source: found.source,
            },
            Err(e) => {
                tracing::warn!("Semantic retrieval unavailable: {}", e);
                EngineResponse::unsupported(CANNOT_ANSWER_TEXT)
            }
        }
    }
}

/// Squared L2 distance; dimension mismatches score as infinitely far
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Embedding("down".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn record(id: &str, text: &str, category: Option<&str>, embedding: Vec<f32>) -> VectorRecord {
        let mut metadata = HashMap::new();
        if let Some(c) = category {
            metadata.insert("category".to_string(), Value::String(c.to_string()));
        }
        VectorRecord {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
            embedding,
        }
    }

    #[tokio::test]
    async fn returns_nearest_record_with_raw_score() {
        let engine = SemanticEngine::from_records(
            vec![
                record("1", "Semesters are 16 weeks long.", Some("academics"), vec![1.0, 0.0]),
                record("2", "The library opens at 8am.", Some("campus"), vec![0.0, 1.0]),
            ],
            Arc::new(FixedEmbedder(vec![0.9, 0.1])),
        );

        let found = engine.nearest("how long is a semester").await.unwrap();
        assert_eq!(found.text, "Semesters are 16 weeks long.");
        assert_eq!(found.source.as_deref(), Some("academics"));
        assert!(found.score < 0.1);
    }

    #[tokio::test]
    async fn decreasing_distance_never_increases_score() {
        // Acceptance at a fixed ceiling is monotonic in the raw distance.
        let far = SemanticEngine::from_records(
            vec![record("1", "x", None, vec![1.0, 0.0])],
            Arc::new(FixedEmbedder(vec![-1.0, 0.0])),
        );
        let near = SemanticEngine::from_records(
            vec![record("1", "x", None, vec![1.0, 0.0])],
            Arc::new(FixedEmbedder(vec![0.5, 0.0])),
        );

        let far_score = far.nearest("q").await.unwrap().score;
        let near_score = near.nearest("q").await.unwrap().score;
        assert!(near_score < far_score);

        let ceiling = 5.0;
        if far_score < ceiling {
            assert!(near_score < ceiling);
        }
    }

    #[tokio::test]
    async fn embed_failure_is_absorbed_by_engine_interface() {
        let engine = SemanticEngine::from_records(
            vec![record("1", "x", None, vec![1.0])],
            Arc::new(FailingEmbedder),
        );

        let response = engine.answer("q").await;
        assert_eq!(response.answer, CANNOT_ANSWER_TEXT);
        assert_eq!(response.confidence, 0.0);
    }
}
