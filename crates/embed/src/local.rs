use async_trait::async_trait;
use faqseek_common::{FaqSeekError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::provider::{Embedder, PROBE_TEXT};

/// In-process ONNX embedder (fastembed)
pub struct FastEmbedder {
    model: Arc<TextEmbedding>,
    name: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedder {
    /// Load a model, downloading it into `cache_dir` on first use
    pub async fn load(name: &str, cache_dir: PathBuf, batch_size: usize) -> Result<Self> {
        let variant = resolve_model(name)?;
        info!("Loading local embedding model {:?} from {}", variant, cache_dir.display());

        let model = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(
                InitOptions::new(variant)
                    .with_cache_dir(cache_dir)
                    .with_show_download_progress(false),
            )
        })
        .await
        .map_err(|e| FaqSeekError::model_unavailable(format!("Model load task failed: {}", e)))?
        .map_err(|e| {
            FaqSeekError::model_unavailable(format!("Failed to load embedding model '{}': {}", name, e))
        })?;

        let mut embedder = Self {
            model: Arc::new(model),
            name: name.to_string(),
            dimension: 0,
            batch_size: batch_size.max(1),
        };

        let probe = embedder.run(vec![PROBE_TEXT.to_string()]).await?;
        embedder.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if embedder.dimension == 0 {
            return Err(FaqSeekError::model_unavailable(format!(
                "Embedding model '{}' returned an empty vector",
                name
            )));
        }

        Ok(embedder)
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;

        tokio::task::spawn_blocking(move || model.embed(texts, Some(batch_size)))
            .await
            .map_err(|e| FaqSeekError::model_unavailable(format!("Embedding task failed: {}", e)))?
            .map_err(|e| FaqSeekError::model_unavailable(format!("Embedding failed: {}", e)))
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.iter().map(|t| t.to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Map a configured model name onto a fastembed model
fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    match name.trim().to_lowercase().as_str() {
        "all-minilm" | "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "paraphrase-minilm" | "paraphrase-multilingual-minilm-l12-v2" => {
            Ok(EmbeddingModel::ParaphraseMLMiniLML12V2)
        }
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        other => Err(FaqSeekError::model_unavailable(format!(
            "Unsupported local embedding model '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        assert_eq!(resolve_model("all-minilm").unwrap(), EmbeddingModel::AllMiniLML6V2);
        assert_eq!(
            resolve_model("Paraphrase-MiniLM").unwrap(),
            EmbeddingModel::ParaphraseMLMiniLML12V2
        );
        assert!(matches!(
            resolve_model("gpt-4"),
            Err(FaqSeekError::ModelUnavailable(_))
        ));
    }
}
