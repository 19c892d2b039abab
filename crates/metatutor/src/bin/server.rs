//! Metatutor server binary
//!
//! Run with: cargo run -p metatutor --bin metatutor-server

use metatutor::{config::AppConfig, server::ApiServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metatutor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("METATUTOR_CONFIG") {
        Ok(path) => AppConfig::load(&path)?,
        Err(_) if std::path::Path::new("config.toml").exists() => {
            AppConfig::load("config.toml")?
        }
        Err(_) => AppConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Target domain: {}", config.models.target_domain);
    tracing::info!("  - Model dir: {}", config.models.dir.display());
    tracing::info!("  - Generate model: {}", config.llm.generate_model);
    tracing::info!("  - Embed model: {}", config.llm.embed_model);

    let server = ApiServer::new(config).await?;

    println!("\nServer starting...");
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /query             - Ask a question");
    println!("  POST /feedback          - Rate an answer (schedules retraining)");
    println!("  GET  /metrics/domain    - Domain classifier metrics");
    println!("  GET  /metrics/intent    - Intent classifier metrics");
    println!("  GET  /metrics/quality   - Quality classifier metrics");
    println!("  GET  /metrics/feedback  - Feedback aggregates");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
