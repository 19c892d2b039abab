//! metatutor: student Q&A backend with meta-controlled answer routing
//!
//! This crate answers short natural-language student queries by routing each
//! one to the most appropriate of several answer engines (rule table,
//! calculator, TF-IDF retrieval, semantic vector search, generative model),
//! gated by domain/intent classification, a safety deny-list, and a post-hoc
//! answer quality check. User feedback is persisted and drives background
//! retraining; refreshed classifiers are hot-swapped into live traffic.

pub mod classify;
pub mod config;
pub mod engines;
pub mod error;
pub mod feedback;
pub mod providers;
pub mod retrain;
pub mod routing;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use routing::{FinalResponse, MetaController};
pub use types::Query;
