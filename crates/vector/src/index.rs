use chrono::{DateTime, Utc};
use faqseek_common::{DistanceMetric, FaqSeekError, Result};
use faqseek_embed::Embedder;
use ndarray::{Array1, Array2};
use tracing::{debug, info};

use crate::similarity::{distances, normalize};
use crate::types::{EntryMetadata, FaqRecord, IndexEntry, IndexStats, Neighbor, RecordId};

/// Write-once in-memory FAQ index.
///
/// Row `i` of `vectors` is the normalized question embedding of the record
/// with id `i`; `entries[i]` is its metadata.
#[derive(Debug)]
pub struct FaqIndex {
    vectors: Array2<f32>,
    entries: Vec<EntryMetadata>,
    metric: DistanceMetric,
    embedding_model: String,
    built_at: DateTime<Utc>,
}

impl FaqIndex {
    /// Embed every record's question and build the index
    pub async fn build_with(
        records: Vec<FaqRecord>,
        embedder: &dyn Embedder,
        metric: DistanceMetric,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(FaqSeekError::EmptyIndex);
        }

        info!(
            "Embedding {} FAQ questions with {}",
            records.len(),
            embedder.model_name()
        );

        let questions: Vec<&str> = records.iter().map(|r| r.question.as_str()).collect();
        let embeddings = embedder.encode_batch(&questions).await?;

        Self::build(records, embeddings, metric, embedder.model_name())
    }

    /// Build from precomputed question embeddings (one per record, same order)
    pub fn build(
        records: Vec<FaqRecord>,
        embeddings: Vec<Vec<f32>>,
        metric: DistanceMetric,
        embedding_model: impl Into<String>,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(FaqSeekError::EmptyIndex);
        }
        if records.len() != embeddings.len() {
            return Err(FaqSeekError::vector_search(format!(
                "Got {} embeddings for {} records",
                embeddings.len(),
                records.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(FaqSeekError::vector_search("Embeddings have zero dimension"));
        }

        let mut flat = Vec::with_capacity(records.len() * dimension);
        for (position, (record, embedding)) in records.iter().zip(&embeddings).enumerate() {
            if record.id as usize != position {
                return Err(FaqSeekError::vector_search(format!(
                    "Record ids must be sequential from 0: found id {} at position {}",
                    record.id, position
                )));
            }
            if embedding.len() != dimension {
                return Err(FaqSeekError::vector_search(format!(
                    "Embedding for record {} has dimension {}, expected {}",
                    record.id,
                    embedding.len(),
                    dimension
                )));
            }
            flat.extend_from_slice(embedding);
        }

        let mut vectors = Array2::from_shape_vec((records.len(), dimension), flat)
            .map_err(|e| FaqSeekError::vector_search(format!("Invalid embedding matrix: {}", e)))?;
        for row in vectors.rows_mut() {
            normalize(row);
        }

        let entries: Vec<EntryMetadata> = records.into_iter().map(EntryMetadata::from).collect();

        info!(
            "FAQ index built - {} entries, dimension {}, metric {}",
            entries.len(),
            dimension,
            metric
        );

        Ok(Self {
            vectors,
            entries,
            metric,
            embedding_model: embedding_model.into(),
            built_at: Utc::now(),
        })
    }

    /// The `k` nearest entries, closest first. Equal distances are ordered
    /// by ascending id.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if vector.len() != self.dimension() {
            return Err(FaqSeekError::invalid_query(format!(
                "Query vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension()
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut query = Array1::from(vector.to_vec());
        normalize(query.view_mut());

        let scores = distances(self.metric, &self.vectors, &query);
        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        debug!(
            "k-NN query: k={}, returned {}, best distance {:?}",
            k,
            ranked.len(),
            ranked.first().map(|(_, d)| *d)
        );

        Ok(ranked
            .into_iter()
            .map(|(row, distance)| Neighbor {
                id: row as RecordId,
                distance,
                metadata: self.entries[row].clone(),
            })
            .collect())
    }

    /// Look up one entry by id
    pub fn entry(&self, id: RecordId) -> Option<IndexEntry<'_>> {
        let row = id as usize;
        self.entries.get(row).map(|metadata| IndexEntry {
            id,
            vector: self.vectors.row(row),
            metadata,
        })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entries: self.len(),
            dimension: self.dimension(),
            metric: self.metric,
            embedding_model: self.embedding_model.clone(),
            built_at: self.built_at,
        }
    }
}
