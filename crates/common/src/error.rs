/// FaqSeek error types
#[derive(Debug, thiserror::Error)]
pub enum FaqSeekError {
    /// Corpus source missing, unreadable or not valid JSON
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// Corpus entry without a question or answer
    #[error("Schema error: {0}")]
    Schema(String),

    /// Embedding model could not be loaded or stopped answering
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Index queried before it was built
    #[error("Vector index has not been built yet")]
    IndexNotBuilt,

    /// Index build attempted over an empty corpus
    #[error("Vector index is empty: the corpus contained no entries")]
    EmptyIndex,

    /// Rejected query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Vector search related error
    #[error("Vector search error: {0}")]
    VectorSearch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FaqSeekError {
    /// Create data load error
    pub fn data_load<S: Into<String>>(msg: S) -> Self {
        Self::DataLoad(msg.into())
    }

    /// Create schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create model unavailable error
    pub fn model_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create invalid query error
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create vector search error
    pub fn vector_search<S: Into<String>>(msg: S) -> Self {
        Self::VectorSearch(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Whether the error only affects the request that raised it.
    ///
    /// Everything else is a startup/configuration problem that will keep
    /// failing until an operator intervenes.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidQuery(_) | Self::Network(_))
    }
}

// HTTP response conversion
impl FaqSeekError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) => 400,
            Self::IndexNotBuilt => 503,
            Self::ModelUnavailable(_) => 503,
            Self::Network(_) => 503,
            Self::DataLoad(_) => 500,
            Self::Schema(_) => 500,
            Self::EmptyIndex => 500,
            Self::VectorSearch(_) => 500,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 500,
            Self::Other(_) => 500,
        }
    }
}
