use serde::{Deserialize, Serialize};

/// `POST /search` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// `GET /health` body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub embedding_backend: String,
    pub embedding_model: String,
    /// Whether the index has been built yet
    pub ready: bool,
}
