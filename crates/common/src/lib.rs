pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, DistanceMetric, EmbeddingBackend};
pub use error::FaqSeekError;
pub type Result<T> = std::result::Result<T, FaqSeekError>;
