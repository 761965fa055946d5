use faqseek_common::{AppConfig, DistanceMetric, FaqSeekError, Result};
use faqseek_embed::{ConfiguredLoader, Embedder, EmbedderLoader};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::corpus::{self, CorpusSource};
use crate::index::FaqIndex;
use crate::types::{IndexStats, Neighbor, QueryResult, RecordId};

/// Number of results returned per search
pub const SEARCH_TOP_K: usize = 5;

/// FAQ search engine.
///
/// Owns the embedding provider and the index, both created on first use.
/// Concurrent first callers wait on the same construction; a failed
/// construction leaves the cell empty so the next call retries.
pub struct SearchEngine {
    loader: Arc<dyn EmbedderLoader>,
    corpus: CorpusSource,
    metric: DistanceMetric,
    embedder: OnceCell<Arc<dyn Embedder>>,
    index: OnceCell<Arc<FaqIndex>>,
}

impl SearchEngine {
    /// Create new search engine; nothing is loaded until first use
    pub fn new(loader: Arc<dyn EmbedderLoader>, corpus: CorpusSource, metric: DistanceMetric) -> Self {
        Self {
            loader,
            corpus,
            metric,
            embedder: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    /// Engine over the configured corpus file and embedding backend
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ConfiguredLoader::new(config)),
            CorpusSource::File(config.corpus_path.clone()),
            config.distance_metric,
        )
    }

    /// Embedding provider, loaded on first call
    pub async fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        self.embedder
            .get_or_try_init(|| self.loader.load())
            .await
            .cloned()
    }

    /// FAQ index, built on first call
    pub async fn index(&self) -> Result<Arc<FaqIndex>> {
        self.index
            .get_or_try_init(|| self.build_index())
            .await
            .cloned()
    }

    async fn build_index(&self) -> Result<Arc<FaqIndex>> {
        let source = self.corpus.clone();
        let records = tokio::task::spawn_blocking(move || corpus::load(&source))
            .await
            .map_err(|e| FaqSeekError::data_load(format!("Corpus load task failed: {}", e)))??;

        if records.is_empty() {
            return Err(FaqSeekError::EmptyIndex);
        }

        let embedder = self.embedder().await?;
        let index = FaqIndex::build_with(records, embedder.as_ref(), self.metric).await?;
        Ok(Arc::new(index))
    }

    /// Index if it has already been built
    pub fn built_index(&self) -> Result<Arc<FaqIndex>> {
        self.index.get().cloned().ok_or(FaqSeekError::IndexNotBuilt)
    }

    /// Load the provider and build the index now instead of on the first
    /// search
    pub async fn warm_up(&self) -> Result<IndexStats> {
        let index = self.index().await?;
        info!("Search engine ready - {} entries", index.len());
        Ok(index.stats())
    }

    /// Statistics of the built index. Never triggers a build.
    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.built_index()?.stats())
    }

    /// k-NN lookup against the built index without initializing anything
    pub fn nearest(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.built_index()?.query(vector, k)
    }

    /// Search the FAQ corpus.
    ///
    /// Returns at most [`SEARCH_TOP_K`] results ordered by similarity,
    /// highest first; equal similarities keep ascending id order.
    pub async fn search(&self, query: &str) -> Result<Vec<QueryResult>> {
        if query.trim().is_empty() {
            return Err(FaqSeekError::invalid_query("Query cannot be empty"));
        }

        debug!("Searching - query length {} chars", query.chars().count());

        // Index first: an empty corpus fails before the model is loaded
        let index = self.index().await?;
        let embedder = self.embedder().await?;

        let query_vector = embedder.encode(query).await?;
        let neighbors = index.query(&query_vector, SEARCH_TOP_K)?;

        let metric = index.metric();
        let mut ranked: Vec<(RecordId, QueryResult)> = neighbors
            .into_iter()
            .map(|neighbor| {
                let similarity = metric.similarity(neighbor.distance);
                (
                    neighbor.id,
                    QueryResult {
                        category: neighbor.metadata.category,
                        question: neighbor.metadata.question,
                        answer: neighbor.metadata.answer,
                        similarity,
                    },
                )
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.similarity
                .total_cmp(&a.1.similarity)
                .then(a.0.cmp(&b.0))
        });

        let results: Vec<QueryResult> = ranked.into_iter().map(|(_, result)| result).collect();

        info!(
            "Search completed - {} results, top similarity {:?}",
            results.len(),
            results.first().map(|r| r.similarity)
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingLoader, SAMPLE_CORPUS};
    use std::time::Duration;

    fn engine_with(loader: Arc<CountingLoader>, corpus: &str) -> SearchEngine {
        SearchEngine::new(
            loader,
            CorpusSource::Inline(corpus.to_string()),
            DistanceMetric::Cosine,
        )
    }

    #[tokio::test]
    async fn test_billing_scenario() {
        let corpus = r#"{"billing": [{"question": "How do I cancel my subscription?", "answer": "Go to settings > billing > cancel."}]}"#;
        let engine = engine_with(Arc::new(CountingLoader::new()), corpus);

        let results = engine.search("cancel subscription").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].answer, "Go to settings > billing > cancel.");
        assert_eq!(results[0].category, "billing");
        assert!(results.iter().all(|r| r.similarity <= results[0].similarity));
    }

    #[tokio::test]
    async fn test_self_similarity() {
        let engine = engine_with(Arc::new(CountingLoader::new()), SAMPLE_CORPUS);
        let records = corpus::parse(SAMPLE_CORPUS).unwrap();

        for record in &records {
            let results = engine.search(&record.question).await.unwrap();
            assert_eq!(results[0].question, record.question);
            assert_eq!(results[0].answer, record.answer);
            assert!((results[0].similarity - 1.0).abs() < 1e-5);
            assert!(results.iter().all(|r| r.similarity <= results[0].similarity));
        }
    }

    #[tokio::test]
    async fn test_result_count_and_order() {
        let engine = engine_with(Arc::new(CountingLoader::new()), SAMPLE_CORPUS);

        let results = engine.search("How do I change my billing settings?").await.unwrap();
        assert_eq!(results.len(), SEARCH_TOP_K);
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }

        let small = r#"{"a": [{"question": "one", "answer": "1"}], "b": [{"question": "two", "answer": "2"}]}"#;
        let engine = engine_with(Arc::new(CountingLoader::new()), small);
        assert_eq!(engine.search("one").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ties_keep_id_order() {
        // Every question is disjoint from the query, so all similarities are 0
        let corpus = r#"{
            "x": [{"question": "alpha", "answer": "0"}, {"question": "beta", "answer": "1"}],
            "y": [{"question": "gamma", "answer": "2"}]
        }"#;
        let engine = engine_with(Arc::new(CountingLoader::new()), corpus);

        let results = engine.search("zzz").await.unwrap();
        let answers: Vec<&str> = results.iter().map(|r| r.answer.as_str()).collect();
        assert!(results.iter().all(|r| r.similarity == results[0].similarity));
        assert_eq!(answers, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let engine = engine_with(Arc::new(CountingLoader::new()), SAMPLE_CORPUS);
        let first = engine.search("where is my invoice").await.unwrap();
        let second = engine.search("where is my invoice").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let loader = Arc::new(CountingLoader::new());
        let engine = engine_with(loader.clone(), SAMPLE_CORPUS);

        for query in ["", "   ", "\n\t"] {
            let err = engine.search(query).await.unwrap_err();
            assert!(matches!(err, FaqSeekError::InvalidQuery(_)));
        }
        // Rejected before touching shared state
        assert_eq!(loader.loads(), 0);
        assert!(matches!(engine.built_index(), Err(FaqSeekError::IndexNotBuilt)));
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let loader = Arc::new(CountingLoader::new());
        let engine = engine_with(loader.clone(), "{}");

        let err = engine.warm_up().await.unwrap_err();
        assert!(matches!(err, FaqSeekError::EmptyIndex));
        assert!(matches!(engine.built_index(), Err(FaqSeekError::IndexNotBuilt)));
        // The model is never loaded for an empty corpus
        assert_eq!(loader.loads(), 0);

        let err = engine.search("hello").await.unwrap_err();
        assert!(matches!(err, FaqSeekError::EmptyIndex));
        assert_eq!(loader.loads(), 0);
    }

    #[tokio::test]
    async fn test_l2_engine_matches_cosine_for_wordless_query() {
        let cosine = engine_with(Arc::new(CountingLoader::new()), SAMPLE_CORPUS);
        let l2 = SearchEngine::new(
            Arc::new(CountingLoader::new()),
            CorpusSource::Inline(SAMPLE_CORPUS.to_string()),
            DistanceMetric::L2,
        );

        // No alphanumeric tokens, so the query embeds to the zero vector
        let a = cosine.search("???").await.unwrap();
        let b = l2.search("???").await.unwrap();
        assert_eq!(a.len(), SEARCH_TOP_K);
        assert!(a.iter().all(|r| r.similarity == 0.0));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_bad_corpus_surfaces_load_errors() {
        let engine = engine_with(Arc::new(CountingLoader::new()), "not json");
        let err = engine.search("hello").await.unwrap_err();
        assert!(matches!(err, FaqSeekError::DataLoad(_)));

        let engine = engine_with(Arc::new(CountingLoader::new()), r#"{"a": [{"question": "q"}]}"#);
        let err = engine.warm_up().await.unwrap_err();
        assert!(matches!(err, FaqSeekError::Schema(_)));
    }

    #[tokio::test]
    async fn test_stats_and_nearest_do_not_build() {
        let loader = Arc::new(CountingLoader::new());
        let engine = engine_with(loader.clone(), SAMPLE_CORPUS);

        assert!(matches!(engine.stats(), Err(FaqSeekError::IndexNotBuilt)));
        assert!(matches!(
            engine.nearest(&[1.0; 64], 1),
            Err(FaqSeekError::IndexNotBuilt)
        ));
        assert_eq!(loader.loads(), 0);

        let stats = engine.warm_up().await.unwrap();
        assert_eq!(stats.entries, 7);
        assert_eq!(stats.embedding_model, "bag-of-words");
        assert_eq!(engine.stats().unwrap().entries, 7);
        assert_eq!(engine.nearest(&[1.0; 64], 3).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let loader = Arc::new(CountingLoader::new().failing_first(1));
        let engine = engine_with(loader.clone(), SAMPLE_CORPUS);

        let err = engine.search("reset password").await.unwrap_err();
        assert!(matches!(err, FaqSeekError::ModelUnavailable(_)));
        assert!(engine.built_index().is_err());

        let results = engine.search("reset password").await.unwrap();
        assert_eq!(results[0].answer, "Use the forgot password link.");
        assert_eq!(loader.loads(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_queries_initialize_once() {
        let loader = Arc::new(CountingLoader::new().with_delay(Duration::from_millis(50)));
        let engine = Arc::new(engine_with(loader.clone(), SAMPLE_CORPUS));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let query = if i % 2 == 0 { "cancel subscription" } else { "delivery time" };
                    engine.search(query).await
                })
            })
            .collect();

        for handle in handles {
            let results = handle.await.unwrap().unwrap();
            assert_eq!(results.len(), SEARCH_TOP_K);
        }

        assert_eq!(loader.loads(), 1);
        let embedder = loader.last_embedder().unwrap();
        // One batch encode per index build, one single encode per query
        assert_eq!(embedder.batch_calls(), 1);
        assert_eq!(embedder.single_calls(), 16);
    }
}
