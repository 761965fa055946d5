//! Deterministic in-process embedders for tests.

use async_trait::async_trait;
use faqseek_common::{FaqSeekError, Result};
use faqseek_embed::{Embedder, EmbedderLoader};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SAMPLE_CORPUS: &str = r#"{
    "billing": [
        {"question": "How do I cancel my subscription?", "answer": "Go to settings > billing > cancel."},
        {"question": "Which payment methods do you accept?", "answer": "Cards and bank transfer."},
        {"question": "Where can I download my invoices?", "answer": "Invoices are under settings > billing."}
    ],
    "account": [
        {"question": "How do I reset my password?", "answer": "Use the forgot password link."},
        {"question": "Can I change the email on my account?", "answer": "Yes, under profile."}
    ],
    "shipping": [
        {"question": "How long does delivery take?", "answer": "3-5 business days."},
        {"question": "Do you ship internationally?", "answer": "Yes, to 40 countries."}
    ]
}"#;

const DIMENSION: usize = 64;

/// Hashed bag-of-words embedder: lowercase alphanumeric tokens, each
/// counted into one of 64 buckets. Identical token bags give identical
/// vectors; shared words raise cosine similarity.
#[derive(Debug, Default)]
pub struct BagOfWordsEmbedder {
    batch_calls: AtomicUsize,
    single_calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `encode_batch` invocations (one per index build)
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// `encode` invocations (one per query)
    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMENSION];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[bucket(&token.to_lowercase())] += 1.0;
        }
        vector
    }
}

/// FNV-1a
fn bucket(token: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIMENSION as u64) as usize
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vectorize(text))
    }

    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Loader that counts constructions and can fail its first attempts
#[derive(Debug, Default)]
pub struct CountingLoader {
    loads: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Duration,
    last: std::sync::Mutex<Option<Arc<BagOfWordsEmbedder>>>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside `load`, widening the window for racing callers
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `n` loads with `ModelUnavailable`
    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Number of `load` calls so far, failed ones included
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// The embedder handed out by the last successful load
    pub fn last_embedder(&self) -> Option<Arc<BagOfWordsEmbedder>> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl EmbedderLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn Embedder>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FaqSeekError::model_unavailable("test model is not ready"));
        }

        let embedder = Arc::new(BagOfWordsEmbedder::new());
        if let Ok(mut last) = self.last.lock() {
            *last = Some(Arc::clone(&embedder));
        }
        Ok(embedder)
    }
}
