//! Ollama client implementing the embedding and generation providers

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::{EmbeddingProvider, GenerativeProvider};

/// Ollama API client with automatic retry
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new client with retry support
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_retries: config.max_retries,
            config: config.clone(),
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Llm("Unknown error".to_string())))
    }

    /// Check if the model server is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let model = self.config.embed_model.clone();
        let text = text.to_string();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let text = text.clone();
            let client = client.clone();

            async move {
                let request = EmbedRequest {
                    model,
                    prompt: text,
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::Embedding(format!(
                        "Embedding failed: HTTP {}",
                        response.status()
                    )));
                }

                let parsed: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Embedding(format!("Invalid embedding response: {}", e)))?;

                Ok(parsed.embedding)
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[async_trait]
impl GenerativeProvider for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let model = self.config.generate_model.clone();
        let prompt = prompt.to_string();
        let client = self.client.clone();
        let temperature = self.config.temperature;
        let num_predict = self.config.max_tokens;

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let prompt = prompt.clone();
            let client = client.clone();

            async move {
                let request = GenerateRequest {
                    model,
                    prompt,
                    stream: false,
                    options: GenerateOptions {
                        temperature,
                        num_predict,
                    },
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Llm(format!("Generation request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::Llm(format!(
                        "Generation failed: HTTP {}",
                        response.status()
                    )));
                }

                let parsed: GenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Llm(format!("Invalid generation response: {}", e)))?;

                Ok(parsed.response.trim().to_string())
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
