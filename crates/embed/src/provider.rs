use async_trait::async_trait;
use faqseek_common::{AppConfig, EmbeddingBackend, FaqSeekError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::client::OllamaEmbedder;

/// Text embedded once at load time to check that the model answers and
/// to learn its dimension.
pub const PROBE_TEXT: &str = "faqseek embedding probe";

/// Common trait for text embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode a single text
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| FaqSeekError::model_unavailable("Embedding provider returned no vector"))
    }

    /// Encode many texts, one vector per text in input order
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Model identifier
    fn model_name(&self) -> &str;
}

/// Builds an embedding provider. Construction is the expensive part
/// (model download/load, server probe) and callers are expected to do it
/// once and share the result.
#[async_trait]
pub trait EmbedderLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Embedder>>;
}

/// Loader for the provider selected in [`AppConfig`]
#[derive(Debug, Clone)]
pub struct ConfiguredLoader {
    backend: EmbeddingBackend,
    model: String,
    ollama_base_url: String,
    batch_size: usize,
    cache_dir: PathBuf,
}

impl ConfiguredLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: config.embedding_backend,
            model: config.embedding_model.clone(),
            ollama_base_url: config.ollama_base_url.clone(),
            batch_size: config.embedding_batch_size,
            cache_dir: config.model_cache_dir.clone(),
        }
    }
}

#[async_trait]
impl EmbedderLoader for ConfiguredLoader {
    async fn load(&self) -> Result<Arc<dyn Embedder>> {
        info!(
            "Loading embedding provider: backend={}, model={}",
            self.backend, self.model
        );

        let embedder: Arc<dyn Embedder> = match self.backend {
            EmbeddingBackend::Ollama => Arc::new(
                OllamaEmbedder::connect(&self.ollama_base_url, &self.model, self.batch_size)
                    .await?,
            ),
            EmbeddingBackend::FastEmbed => self.load_local().await?,
        };

        info!(
            "Embedding provider ready: model={}, dimension={}",
            embedder.model_name(),
            embedder.dimension()
        );
        Ok(embedder)
    }
}

impl ConfiguredLoader {
    #[cfg(feature = "fastembed")]
    async fn load_local(&self) -> Result<Arc<dyn Embedder>> {
        let embedder =
            crate::local::FastEmbedder::load(&self.model, self.cache_dir.clone(), self.batch_size)
                .await?;
        Ok(Arc::new(embedder))
    }

    #[cfg(not(feature = "fastembed"))]
    async fn load_local(&self) -> Result<Arc<dyn Embedder>> {
        Err(FaqSeekError::model_unavailable(format!(
            "Model '{}' needs the local backend but faqseek was built without the 'fastembed' feature (cache dir {})",
            self.model,
            self.cache_dir.display()
        )))
    }
}
