use async_trait::async_trait;
use faqseek_common::{FaqSeekError, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::provider::{Embedder, PROBE_TEXT};
use crate::types::{EmbedRequest, EmbedResponse};

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    client: Client,
    model: String,
    dimension: usize,
    batch_size: usize,
    max_retries: u32,
}

impl OllamaEmbedder {
    /// Connect to an Ollama server and verify the model answers.
    ///
    /// Fails with `ModelUnavailable` when the server is unreachable or the
    /// model is not pulled.
    pub async fn connect(
        base_url: impl Into<String>,
        model: impl Into<String>,
        batch_size: usize,
    ) -> Result<Self> {
        Self::connect_with_retries(base_url, model, batch_size, DEFAULT_MAX_RETRIES).await
    }

    /// Connect with a custom retry count per request
    pub async fn connect_with_retries(
        base_url: impl Into<String>,
        model: impl Into<String>,
        batch_size: usize,
        max_retries: u32,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| FaqSeekError::model_unavailable(format!("Failed to create HTTP client: {}", e)))?;

        let mut embedder = Self {
            base_url,
            client,
            model: model.into(),
            dimension: 0,
            batch_size: batch_size.max(1),
            max_retries: max_retries.max(1),
        };

        let probe = embedder
            .embed_with_retry(vec![PROBE_TEXT.to_string()])
            .await
            .map_err(|e| {
                FaqSeekError::model_unavailable(format!(
                    "Embedding model '{}' is not available at {}: {}",
                    embedder.model, embedder.base_url, e
                ))
            })?;

        embedder.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if embedder.dimension == 0 {
            return Err(FaqSeekError::model_unavailable(format!(
                "Embedding model '{}' returned an empty vector",
                embedder.model
            )));
        }

        info!(
            "Ollama embedder connected: {} (model={}, dimension={})",
            embedder.base_url, embedder.model, embedder.dimension
        );
        Ok(embedder)
    }

    /// Embed one request's worth of texts (with retry logic)
    async fn embed_with_retry(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest::new(self.model.clone(), input);

        debug!(
            "Generating embeddings - Model: {}, Texts: {}",
            request.model,
            request.input.len()
        );

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.try_embed(&url, &request).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay = std::time::Duration::from_secs(2u64.pow(attempt - 1));
                        warn!(
                            "Embedding request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt, self.max_retries, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FaqSeekError::network("All retries failed")))
    }

    /// Single attempt to generate embeddings
    async fn try_embed(&self, url: &str, request: &EmbedRequest) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| FaqSeekError::network(format!("Failed to send embedding request: {}", e)))?
            .error_for_status()
            .map_err(|e| FaqSeekError::network(format!("Ollama embedding API error: {}", e)))?;

        let result: EmbedResponse = response.json().await.map_err(|e| {
            FaqSeekError::network(format!("Failed to parse embedding response: {}", e))
        })?;

        if result.embeddings.len() != request.input.len() {
            return Err(FaqSeekError::model_unavailable(format!(
                "Ollama returned {} embeddings for {} inputs",
                result.embeddings.len(),
                request.input.len()
            )));
        }

        Ok(result.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let input = chunk.iter().map(|t| t.to_string()).collect();
            let embeddings = self.embed_with_retry(input).await?;

            if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimension) {
                return Err(FaqSeekError::model_unavailable(format!(
                    "Embedding dimension changed from {} to {}",
                    self.dimension,
                    bad.len()
                )));
            }
            vectors.extend(embeddings);
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
