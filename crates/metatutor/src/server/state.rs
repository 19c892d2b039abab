//! Application state for the metatutor server

use std::sync::Arc;

use crate::classify::{ClassifierBundle, SharedBundle};
use crate::config::AppConfig;
use crate::engines::{CalculatorEngine, EngineRegistry, GenerativeEngine, SemanticEngine};
use crate::error::Result;
use crate::feedback::FeedbackStore;
use crate::providers::OllamaClient;
use crate::retrain::{CommandTrainer, RetrainContext, RetrainCoordinator};
use crate::routing::MetaController;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    controller: MetaController,
    bundle: SharedBundle,
    store: Arc<FeedbackStore>,
    retrain: RetrainCoordinator,
}

impl AppState {
    /// Create new application state.
    ///
    /// Loads every model artifact up front; a missing or corrupt classifier
    /// artifact is fatal here, at process start. Once loaded, classification
    /// is assumed non-failing.
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing metatutor application state...");

        let bundle = ClassifierBundle::load(&config.models, &config.knowledge)?;
        let shared = SharedBundle::new(bundle);

        let ollama = Arc::new(OllamaClient::new(&config.llm));
        tracing::info!(
            "Model client initialized ({} / {})",
            config.llm.generate_model,
            config.llm.embed_model
        );

        let semantic = Arc::new(SemanticEngine::load(
            &config.knowledge.vectors_path,
            ollama.clone(),
        )?);
        tracing::info!("Semantic index loaded ({} records)", semantic.len());

        let mut registry = EngineRegistry::new();
        registry.register(Arc::new(CalculatorEngine::new()));
        registry.register(Arc::new(GenerativeEngine::new(ollama.clone())));

        let controller = MetaController::new(
            shared.clone(),
            registry,
            semantic,
            config.routing.clone(),
            config.models.target_domain.clone(),
        );

        let store = Arc::new(FeedbackStore::new(&config.feedback.db_path)?);
        tracing::info!("Feedback store opened at {}", config.feedback.db_path.display());

        let retrain = RetrainCoordinator::spawn(RetrainContext {
            store: store.clone(),
            bundle: shared.clone(),
            trainer: Arc::new(CommandTrainer::new(config.retrain.clone())),
            models: config.models.clone(),
            knowledge: config.knowledge.clone(),
            export_path: config.feedback.export_path.clone(),
        });
        tracing::info!("Retraining coordinator started");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                controller,
                bundle: shared,
                store,
                retrain,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the meta-controller
    pub fn controller(&self) -> &MetaController {
        &self.inner.controller
    }

    /// Get the live classifier bundle handle
    pub fn bundle(&self) -> &SharedBundle {
        &self.inner.bundle
    }

    /// Get the feedback store
    pub fn store(&self) -> &Arc<FeedbackStore> {
        &self.inner.store
    }

    /// Get the retraining coordinator
    pub fn retrain(&self) -> &RetrainCoordinator {
        &self.inner.retrain
    }
}
