use serde::{Deserialize, Serialize};

/// Ollama `/api/embed` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Model name (e.g., "all-minilm", "nomic-embed-text")
    pub model: String,

    /// Texts to embed, one vector per entry
    pub input: Vec<String>,

    /// Truncate inputs longer than the model context instead of failing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate: Option<bool>,
}

impl EmbedRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
            truncate: Some(true),
        }
    }
}

/// Ollama `/api/embed` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// Model name
    #[serde(default)]
    pub model: String,

    /// One embedding per input, in request order
    pub embeddings: Vec<Vec<f32>>,
}
