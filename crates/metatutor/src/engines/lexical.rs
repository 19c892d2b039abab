//! Lexical retrieval engine: TF-IDF cosine similarity over the QA corpus

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

use super::rule::CANNOT_ANSWER_TEXT;
use super::{Engine, EngineKind, EngineResponse};

/// Similarity floor below which the engine refuses to answer
pub const DEFAULT_SIMILARITY_FLOOR: f32 = 0.7;

/// Corpus answers matching these are treated as noise, not genuine answers
const GENERIC_NON_ANSWERS: &[&str] = &["i don't know", "not sure", "unknown", "no answer"];

const STOPWORDS: &[&str] = &[
    "what", "is", "the", "a", "an", "and", "or", "for", "in", "on", "to", "of", "are", "how",
    "does", "do", "can", "will", "be", "this", "that", "with", "from", "by", "at", "as", "it",
    "its", "which",
];

/// One indexed question/answer pair
#[derive(Debug, Clone)]
pub struct KbEntry {
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    facts: Vec<RawFact>,
}

#[derive(Debug, Deserialize)]
struct RawFact {
    question: Option<String>,
    answer: Option<String>,
    category: Option<String>,
}

/// Best-match outcome of a lexical lookup
#[derive(Debug, Clone)]
pub struct LexicalMatch {
    /// Answer text (the fixed cannot-answer text when rejected)
    pub answer: String,
    /// Cosine similarity of the best corpus match
    pub similarity: f32,
    /// Corpus category of the match; `None` marks a rejection
    pub source: Option<String>,
}

/// TF-IDF retrieval over a static question/answer corpus.
///
/// Fitted once at construction; retraining builds a fresh instance as part of
/// the classifier bundle rather than refitting in place.
pub struct LexicalEngine {
    floor: f32,
    entries: Vec<KbEntry>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    /// L2-normalized TF-IDF row per entry, index-aligned with `entries`
    rows: Vec<Vec<f32>>,
}

impl LexicalEngine {
    /// Load and fit the engine from the knowledge base JSON file
    pub fn load(path: &Path, floor: f32) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::model("lexical", format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: KnowledgeBaseFile = serde_json::from_str(&content).map_err(|e| {
            Error::model("lexical", format!("cannot parse {}: {}", path.display(), e))
        })?;

        let entries: Vec<KbEntry> = file
            .facts
            .into_iter()
            .filter_map(|fact| {
                let question = fact.question?;
                let answer = fact.answer?;
                Some(KbEntry {
                    question,
                    answer,
                    category: fact.category,
                })
            })
            .collect();

        Ok(Self::fit(entries, floor))
    }

    /// Fit the TF-IDF vector space over the corpus questions
    pub fn fit(entries: Vec<KbEntry>, floor: f32) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let tokenized: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| tokenize(&entry.question))
            .collect();

        for tokens in &tokenized {
            for token in tokens {
                let next = vocabulary.len();
                vocabulary.entry(token.clone()).or_insert(next);
            }
        }

        // Smooth IDF: ln((1 + n) / (1 + df)) + 1
        let n = entries.len() as f32;
        let mut df = vec![0.0f32; vocabulary.len()];
        for tokens in &tokenized {
            let mut seen = vec![false; vocabulary.len()];
            for token in tokens {
                let idx = vocabulary[token];
                if !seen[idx] {
                    seen[idx] = true;
                    df[idx] += 1.0;
                }
            }
        }
        let idf: Vec<f32> = df
            .iter()
            .map(|d| ((1.0 + n) / (1.0 + d)).ln() + 1.0)
            .collect();

        let rows: Vec<Vec<f32>> = tokenized
            .iter()
            .map(|tokens| vectorize(tokens, &vocabulary, &idf))
            .collect();

        Self {
            floor,
            entries,
            vocabulary,
            idf,
            rows,
        }
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retrieve the best corpus match for a query.
    ///
    /// Rejects (source `None`, fixed text) when the best similarity is under
    /// the floor, or when the matched answer is corpus noise: tautological
    /// (equals the query), under 10 characters, or a generic non-answer.
    pub fn retrieve(&self, query: &str) -> LexicalMatch {
        if self.entries.is_empty() {
            return LexicalMatch {
                answer: CANNOT_ANSWER_TEXT.to_string(),
                similarity: 0.0,
                source: None,
            };
        }

        let query_vector = vectorize(&tokenize(query), &self.vocabulary, &self.idf);

        let (best_index, best_similarity) = self
            .rows
            .iter()
            .map(|row| cosine(&query_vector, row))
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .expect("corpus is non-empty");

        if best_similarity < self.floor {
            return LexicalMatch {
                answer: CANNOT_ANSWER_TEXT.to_string(),
                similarity: best_similarity,
                source: None,
            };
        }

        let best = &self.entries[best_index];
        let answer = best.answer.trim();
        let is_tautology = answer.to_lowercase() == query.trim().to_lowercase();
        let is_noise = answer.len() < 10
            || GENERIC_NON_ANSWERS.contains(&answer.to_lowercase().as_str());

        if is_tautology || is_noise {
            return LexicalMatch {
                answer: CANNOT_ANSWER_TEXT.to_string(),
                similarity: best_similarity,
                source: None,
            };
        }

        LexicalMatch {
            answer: answer.to_string(),
            similarity: best_similarity,
            source: best.category.clone(),
        }
    }
}

#[async_trait]
impl Engine for LexicalEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::LexicalRetrieval
    }

    async fn answer(&self, query: &str) -> EngineResponse {
        let result = self.retrieve(query);
        EngineResponse {
            answer: result.answer,
            confidence: result.similarity,
            source: result.source,
        }
    }
}

/// Lowercase alphanumeric tokens, stop-word filtered
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2 && !STOPWORDS.contains(w))
        .map(|s| s.to_string())
        .collect()
}

/// Dense L2-normalized TF-IDF vector over the fitted vocabulary
fn vectorize(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f32]) -> Vec<f32> {
    let mut vector = vec![0.0f32; idf.len()];
    for token in tokens {
        if let Some(&idx) = vocabulary.get(token) {
            vector[idx] += 1.0;
        }
    }
    for (value, weight) in vector.iter_mut().zip(idf) {
        *value *= weight;
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Dot product of two L2-normalized vectors
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
