use crate::error::FaqSeekError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which embedding provider backs the search engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Remote Ollama server (`/api/embed`)
    Ollama,
    /// Local ONNX model through fastembed
    FastEmbed,
}

impl FromStr for EmbeddingBackend {
    type Err = FaqSeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "fastembed" => Ok(Self::FastEmbed),
            other => Err(FaqSeekError::config(format!(
                "Unknown embedding backend '{}' (expected 'ollama' or 'fastembed')",
                other
            ))),
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::FastEmbed => write!(f, "fastembed"),
        }
    }
}

/// Distance metric of the vector index.
///
/// The metric also owns the conversion from a raw distance to the
/// similarity score reported to callers, so swapping metrics keeps the
/// similarity contract intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cos(a, b)`, range [0, 2]
    Cosine,
    /// Squared Euclidean distance between unit vectors, range [0, 4]
    L2,
}

impl DistanceMetric {
    /// Convert a distance produced under this metric into a similarity score
    pub fn similarity(&self, distance: f32) -> f32 {
        match self {
            Self::Cosine => 1.0 - distance,
            // |a - b|^2 = 2 - 2cos(a, b) for unit vectors
            Self::L2 => 1.0 - distance / 2.0,
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = FaqSeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "l2" | "euclidean" => Ok(Self::L2),
            other => Err(FaqSeekError::config(format!(
                "Unknown distance metric '{}' (expected 'cosine' or 'l2')",
                other
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::L2 => write!(f, "l2"),
        }
    }
}

/// FaqSeek application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// FAQ corpus file (category -> [{question, answer}])
    pub corpus_path: PathBuf,

    /// Embedding provider backend
    pub embedding_backend: EmbeddingBackend,

    /// Embedding model name
    pub embedding_model: String,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Number of texts sent per embedding request during index build
    pub embedding_batch_size: usize,

    /// Download/cache directory for local models
    pub model_cache_dir: PathBuf,

    /// Vector index distance metric
    pub distance_metric: DistanceMetric,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("./faqs.json"),
            embedding_backend: EmbeddingBackend::Ollama,
            embedding_model: "all-minilm".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_batch_size: 32,
            model_cache_dir: PathBuf::from("./db/models"),
            distance_metric: DistanceMetric::Cosine,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: PathBuf::from("./db/log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, FaqSeekError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            corpus_path: Self::get_env_path("CORPUS_PATH").unwrap_or(defaults.corpus_path),
            embedding_backend: match std::env::var("EMBEDDING_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.embedding_backend,
            },
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_batch_size: std::env::var("EMBEDDING_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.embedding_batch_size),
            model_cache_dir: Self::get_env_path("MODEL_CACHE_DIR")
                .unwrap_or(defaults.model_cache_dir),
            distance_metric: match std::env::var("DISTANCE_METRIC") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.distance_metric,
            },
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), FaqSeekError> {
        let mut dirs = vec![&self.log_dir];
        if self.embedding_backend == EmbeddingBackend::FastEmbed {
            dirs.push(&self.model_cache_dir);
        }

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    FaqSeekError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Get log file path
    pub fn get_log_path(&self, filename: &str) -> PathBuf {
        self.log_dir.join(filename)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), FaqSeekError> {
        if self.embedding_model.trim().is_empty() {
            return Err(FaqSeekError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_backend == EmbeddingBackend::Ollama
            && !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://")
        {
            return Err(FaqSeekError::config(
                "Ollama base URL must start with http:// or https://",
            ));
        }

        if self.embedding_batch_size == 0 {
            return Err(FaqSeekError::config("Embedding batch size cannot be 0"));
        }

        if self.server_port == 0 {
            return Err(FaqSeekError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}
