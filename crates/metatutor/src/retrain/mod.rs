//! Feedback-driven retraining and classifier hot-swap
//!
//! A feedback event requests a retraining cycle: export the accumulated
//! feedback, run the offline trainers, reload the classifier bundle from the
//! refreshed artifacts, and atomically swap it into live traffic. The
//! coordinator is a single background task: at most one cycle runs at a time,
//! at most one further request queues, and anything beyond that coalesces.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::timeout;
use uuid::Uuid;

use crate::classify::{ClassifierBundle, SharedBundle};
use crate::config::{KnowledgeConfig, ModelConfig, RetrainConfig};
use crate::error::{Error, Result};
use crate::feedback::FeedbackStore;

/// A retrainable classification capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Domain,
    Intent,
    Quality,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Domain, Capability::Intent, Capability::Quality];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Domain => "domain",
            Capability::Intent => "intent",
            Capability::Quality => "quality",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque training operation with a file-system contract: on success the
/// capability's model artifact has been rewritten at its well-known path.
#[async_trait]
pub trait Trainer: Send + Sync {
    async fn train(&self, capability: Capability) -> Result<()>;
}

/// Runs the configured trainer command as a bounded subprocess
pub struct CommandTrainer {
    config: RetrainConfig,
}

impl CommandTrainer {
    pub fn new(config: RetrainConfig) -> Self {
        Self { config }
    }

    fn argv(&self, capability: Capability) -> &[String] {
        match capability {
            Capability::Domain => &self.config.domain_trainer,
            Capability::Intent => &self.config.intent_trainer,
            Capability::Quality => &self.config.quality_trainer,
        }
    }
}

#[async_trait]
impl Trainer for CommandTrainer {
    async fn train(&self, capability: Capability) -> Result<()> {
        let argv = self.argv(capability);
        if argv.is_empty() {
            tracing::debug!("{} trainer disabled, skipping", capability);
            return Ok(());
        }

        let mut command = tokio::process::Command::new(&argv[0]);
        command.args(&argv[1..]).kill_on_drop(true);

        let status = timeout(Duration::from_secs(self.config.timeout_secs), command.status())
            .await
            .map_err(|_| {
                Error::retrain(format!(
                    "{} trainer timed out after {}s",
                    capability, self.config.timeout_secs
                ))
            })?
            .map_err(|e| Error::retrain(format!("{} trainer failed to start: {}", capability, e)))?;

        if !status.success() {
            return Err(Error::retrain(format!(
                "{} trainer exited with {}",
                capability, status
            )));
        }
        Ok(())
    }
}

/// Outcome of a retraining request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainSignal {
    /// Request accepted; a cycle will run
    Scheduled,
    /// A cycle is already running with one queued; this request was folded in
    Coalesced,
}

/// Everything a retraining cycle needs
pub struct RetrainContext {
    pub store: Arc<FeedbackStore>,
    pub bundle: SharedBundle,
    pub trainer: Arc<dyn Trainer>,
    pub models: ModelConfig,
    pub knowledge: KnowledgeConfig,
    pub export_path: PathBuf,
}

/// Handle for requesting retraining runs
#[derive(Clone)]
pub struct RetrainCoordinator {
    sender: mpsc::Sender<()>,
}

impl RetrainCoordinator {
    /// Spawn the background coordinator task
    pub fn spawn(context: RetrainContext) -> Self {
        let (sender, mut receiver) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            while receiver.recv().await.is_some() {
                let run_id = Uuid::new_v4();
                tracing::info!(run = %run_id, "Retraining run started");
                match run_cycle(&context).await {
                    Ok(version) => {
                        tracing::info!(run = %run_id, "Retraining complete, bundle swapped to v{}", version);
                    }
                    Err(e) => {
                        // Previous bundle stays authoritative.
                        tracing::error!(run = %run_id, "Retraining failed: {}", e);
                    }
                }
            }
        });

        Self { sender }
    }

    /// Request a retraining run. Fire-and-forget: returns immediately with
    /// whether the request was scheduled or coalesced into a pending run.
    pub fn request(&self) -> RetrainSignal {
        match self.sender.try_send(()) {
            Ok(()) => RetrainSignal::Scheduled,
            Err(TrySendError::Full(())) => {
                tracing::debug!("Retraining already pending, request coalesced");
                RetrainSignal::Coalesced
            }
            Err(TrySendError::Closed(())) => {
                tracing::error!("Retraining coordinator task is gone");
                RetrainSignal::Coalesced
            }
        }
    }
}

/// One retraining cycle: export, train, reload, swap.
///
/// Individual trainer failures are logged and tolerated (partial success);
/// export or reload failure aborts the cycle with the old bundle intact.
async fn run_cycle(context: &RetrainContext) -> Result<u64> {
    let exported = context.store.export_csv(&context.export_path)?;
    tracing::info!(
        "Exported {} feedback rows to {}",
        exported,
        context.export_path.display()
    );

    for capability in Capability::ALL {
        if let Err(e) = context.trainer.train(capability).await {
            tracing::warn!("{} training failed, keeping previous model: {}", capability, e);
        }
    }

    let fresh = ClassifierBundle::load(&context.models, &context.knowledge)?;
    Ok(context.bundle.replace(fresh))
}
