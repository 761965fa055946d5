use faqseek_common::AppConfig;
use faqseek_vector::SearchEngine;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Search engine (embedder and index are built lazily inside)
    pub engine: Arc<SearchEngine>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, engine: Arc<SearchEngine>) -> Self {
        Self { config, engine }
    }
}
