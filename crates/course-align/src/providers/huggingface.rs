//! Hugging Face feature-extraction embedding client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// Embedding provider backed by the hosted inference pipeline
pub struct HuggingFaceEmbedder {
    client: Client,
    config: EmbeddingConfig,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a str,
    options: FeatureOptions,
}

#[derive(Serialize)]
struct FeatureOptions {
    wait_for_model: bool,
}

impl HuggingFaceEmbedder {
    /// Create a client; the API key is read from `config.api_key_env`
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Self::with_api_key(config, config.api_key())
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Execute with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Embedding request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::embedding("Unknown error")))
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = truncate_chars(text, self.config.max_input_chars);
        let url = self.endpoint();
        let url = url.as_str();
        let client = &self.client;
        let api_key = self.api_key.as_deref();

        self.retry_request(|| async move {
            let mut request = client.post(url).json(&FeatureRequest {
                inputs: input,
                options: FeatureOptions { wait_for_model: true },
            });
            if let Some(key) = api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await?;

            if !response.status().is_success() {
                return Err(Error::embedding(format!(
                    "Embedding API error: HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response.json().await?;

            normalize_embedding(&body)
        })
        .await
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.embed("health check").await.is_ok())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

/// Normalize a feature-extraction response into a flat vector
///
/// The pipeline answers either `[f, f, ...]` or `[[f, f, ...], ...]`. If the
/// first element is itself an array it is taken; otherwise the array is
/// taken as-is.
pub fn normalize_embedding(value: &Value) -> Result<Vec<f32>> {
    let outer = value
        .as_array()
        .ok_or_else(|| Error::embedding("Embedding response is not an array"))?;

    let vector = match outer.first() {
        Some(Value::Array(inner)) => inner,
        _ => outer,
    };

    if vector.is_empty() {
        return Err(Error::embedding("Embedding response is empty"));
    }

    vector
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| Error::embedding(format!("Non-numeric embedding value: {}", v)))
        })
        .collect()
}

/// First `max_chars` characters of `text`
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
