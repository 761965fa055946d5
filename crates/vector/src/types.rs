use chrono::{DateTime, Utc};
use faqseek_common::DistanceMetric;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Stable record identifier, `0..N-1` in corpus traversal order
pub type RecordId = u32;

/// One flattened FAQ entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: RecordId,
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// Metadata stored next to every indexed vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub category: String,
    pub question: String,
    pub answer: String,
}

impl From<FaqRecord> for EntryMetadata {
    fn from(record: FaqRecord) -> Self {
        Self {
            category: record.category,
            question: record.question,
            answer: record.answer,
        }
    }
}

/// Borrowed view of one index row
#[derive(Debug, Clone)]
pub struct IndexEntry<'a> {
    pub id: RecordId,

    /// Stored (normalized) question embedding
    pub vector: ArrayView1<'a, f32>,

    pub metadata: &'a EntryMetadata,
}

/// Raw k-NN hit
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: RecordId,

    /// Distance under the index metric (smaller is closer)
    pub distance: f32,

    pub metadata: EntryMetadata,
}

/// Search result returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub category: String,
    pub question: String,
    pub answer: String,

    /// Similarity derived from distance by the index metric
    pub similarity: f32,
}

/// Index statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub embedding_model: String,
    pub built_at: DateTime<Utc>,
}
