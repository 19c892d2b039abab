//! The live classifier bundle and its atomic swap handle
//!
//! All learned state a query touches — the three classifiers and the fitted
//! lexical index — lives in one immutable bundle shared behind a read-mostly
//! pointer. Retraining builds a whole new bundle and swaps the pointer; a
//! query in flight keeps the snapshot it took and never observes a mix of
//! old and new state.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{KnowledgeConfig, ModelConfig};
use crate::engines::lexical::{LexicalEngine, DEFAULT_SIMILARITY_FLOOR};
use crate::error::Result;

use super::model::LinearTextClassifier;

/// The set of live classification capabilities plus the fitted lexical index
pub struct ClassifierBundle {
    /// Domain classifier (in-scope gating)
    pub domain: LinearTextClassifier,
    /// Intent classifier (engine selection)
    pub intent: LinearTextClassifier,
    /// Answer quality classifier (post-hoc gate)
    pub quality: LinearTextClassifier,
    /// Fitted lexical retrieval index
    pub lexical: LexicalEngine,
    /// Monotonic bundle version, bumped on every successful swap
    pub version: u64,
    /// When this bundle was loaded
    pub loaded_at: DateTime<Utc>,
}

impl ClassifierBundle {
    /// Load a fresh bundle from the model and knowledge-base artifacts.
    ///
    /// Any missing or corrupt artifact fails the whole load; callers either
    /// abort startup or keep the previous bundle authoritative.
    pub fn load(models: &ModelConfig, knowledge: &KnowledgeConfig) -> Result<Self> {
        let domain = LinearTextClassifier::load("domain", &models.model_path("domain"))?;
        let intent = LinearTextClassifier::load("intent", &models.model_path("intent"))?;
        let quality = LinearTextClassifier::load("quality", &models.model_path("quality"))?;
        let lexical = LexicalEngine::load(&knowledge.corpus_path, DEFAULT_SIMILARITY_FLOOR)?;

        tracing::info!(
            "Classifier bundle loaded ({} lexical entries)",
            lexical.len()
        );

        Ok(Self {
            domain,
            intent,
            quality,
            lexical,
            version: 0,
            loaded_at: Utc::now(),
        })
    }
}

/// Process-wide handle to the current bundle.
///
/// Readers take a cheap pointer snapshot; the retraining coordinator replaces
/// the pointer under a short write lock. Replacement is atomic from the
/// reader's perspective.
#[derive(Clone)]
pub struct SharedBundle {
    inner: Arc<RwLock<Arc<ClassifierBundle>>>,
}

impl SharedBundle {
    pub fn new(bundle: ClassifierBundle) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(bundle))),
        }
    }

    /// Snapshot the current bundle. The snapshot stays valid for the whole
    /// query even if a swap happens mid-flight.
    pub fn current(&self) -> Arc<ClassifierBundle> {
        Arc::clone(&self.inner.read())
    }

    /// Atomically replace the live bundle, bumping its version.
    /// Returns the new version.
    pub fn replace(&self, mut bundle: ClassifierBundle) -> u64 {
        let mut slot = self.inner.write();
        bundle.version = slot.version + 1;
        bundle.loaded_at = Utc::now();
        let version = bundle.version;
        *slot = Arc::new(bundle);
        version
    }
}
