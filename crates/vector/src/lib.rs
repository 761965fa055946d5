//! FaqSeek Vector Search Engine
//!
//! Corpus loading, the in-memory FAQ index and the query pipeline.

pub mod corpus;
mod engine;
mod index;
mod similarity;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
mod types;

pub use corpus::CorpusSource;
pub use engine::{SearchEngine, SEARCH_TOP_K};
pub use index::FaqIndex;
pub use similarity::cosine_similarity;
pub use types::{EntryMetadata, FaqRecord, IndexEntry, IndexStats, Neighbor, QueryResult, RecordId};
