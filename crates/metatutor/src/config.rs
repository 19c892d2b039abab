//! Configuration for the metatutor service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Model artifact configuration
    #[serde(default)]
    pub models: ModelConfig,
    /// Knowledge base configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    /// Routing thresholds and gates
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Generative/embedding model configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Feedback persistence configuration
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Retraining configuration
    #[serde(default)]
    pub retrain: RetrainConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_body_size: 64 * 1024,
        }
    }
}

/// Classifier model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory holding `{name}_model.json` and `{name}_metrics.json`
    pub dir: PathBuf,
    /// The single in-scope domain label
    pub target_domain: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            target_domain: "STUDENT".to_string(),
        }
    }
}

impl ModelConfig {
    /// Path to a classifier artifact
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}_model.json", name))
    }

    /// Path to a classifier's evaluation metrics artifact
    pub fn metrics_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}_metrics.json", name))
    }
}

/// Knowledge base artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Question/answer corpus for lexical retrieval
    pub corpus_path: PathBuf,
    /// Pre-built embedding index (one JSON record per line)
    pub vectors_path: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("datasets/knowledge_base.json"),
            vectors_path: PathBuf::from("datasets/knowledge_base_vectors.jsonl"),
        }
    }
}

/// Routing thresholds and safety gates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Cosine similarity a lexical match must reach before the controller
    /// accepts it for a factual query
    pub lexical_accept: f32,
    /// Raw nearest-neighbor distance ceiling for accepting a semantic match.
    /// This value is coupled to the embedding space scale; treat it as a
    /// deployment tunable, not a calibrated probability.
    pub semantic_score_ceiling: f32,
    /// Forbidden terms (case-insensitive substring match)
    pub deny_list: Vec<String>,
    /// Terms that force calculator routing regardless of classified intent
    pub numeric_triggers: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            lexical_accept: 0.8,
            semantic_score_ceiling: 5.0,
            deny_list: vec![
                "hack".to_string(),
                "cheat".to_string(),
                "plagiarize".to_string(),
                "leaked paper".to_string(),
                "exam answers".to_string(),
            ],
            numeric_triggers: vec![
                "multiply".to_string(),
                "add".to_string(),
                "sum".to_string(),
                "percentage".to_string(),
                "percent".to_string(),
                "average".to_string(),
                "cgpa".to_string(),
                "gpa".to_string(),
                "calculate".to_string(),
            ],
        }
    }
}

/// Generative/embedding model configuration (Ollama-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the model server
    pub base_url: String,
    /// Model used for answer generation
    pub generate_model: String,
    /// Model used for query embeddings
    pub embed_model: String,
    /// Maximum generated output length in tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            max_tokens: 120,
            temperature: 0.2,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Feedback persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// SQLite database path
    pub db_path: PathBuf,
    /// Flat dataset export path consumed by the trainers
    pub export_path: PathBuf,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("feedback/feedback.db"),
            export_path: PathBuf::from("datasets/feedback_export.csv"),
        }
    }
}

/// Retraining configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainConfig {
    /// Per-trainer timeout in seconds
    pub timeout_secs: u64,
    /// Trainer command for the domain classifier (argv; empty disables)
    pub domain_trainer: Vec<String>,
    /// Trainer command for the intent classifier (argv; empty disables)
    pub intent_trainer: Vec<String>,
    /// Trainer command for the quality classifier (argv; empty disables)
    pub quality_trainer: Vec<String>,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            domain_trainer: vec!["python3".to_string(), "ml/train_domain.py".to_string()],
            intent_trainer: vec!["python3".to_string(), "ml/train_intent.py".to_string()],
            quality_trainer: vec!["python3".to_string(), "ml/train_quality.py".to_string()],
        }
    }
}
