//! FAQ corpus loading
//!
//! The corpus is a JSON object mapping a category name to an ordered list
//! of `{question, answer}` objects:
//!
//! ```json
//! {
//!   "billing": [
//!     {"question": "How do I cancel my subscription?", "answer": "Go to settings > billing > cancel."}
//!   ]
//! }
//! ```
//!
//! Loading flattens it into records with ids assigned in document order.

use faqseek_common::{FaqSeekError, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::types::{FaqRecord, RecordId};

/// Where the corpus comes from
#[derive(Debug, Clone)]
pub enum CorpusSource {
    /// JSON file on disk
    File(PathBuf),
    /// JSON text held in memory
    Inline(String),
}

impl CorpusSource {
    fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                FaqSeekError::data_load(format!(
                    "Failed to read corpus {}: {}",
                    path.display(),
                    e
                ))
            }),
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }
}

/// Read and flatten a corpus
pub fn load(source: &CorpusSource) -> Result<Vec<FaqRecord>> {
    let text = source.read()?;
    let records = parse(&text)?;

    info!(
        "Loaded FAQ corpus from {}: {} entries",
        source.describe(),
        records.len()
    );
    Ok(records)
}

/// Flatten corpus JSON text into records
pub fn parse(text: &str) -> Result<Vec<FaqRecord>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| FaqSeekError::data_load(format!("Corpus is not valid JSON: {}", e)))?;

    let categories = document.as_object().ok_or_else(|| {
        FaqSeekError::data_load("Corpus must be a JSON object of category -> entries")
    })?;

    let mut records = Vec::new();
    for (category, entries) in categories {
        let entries = entries.as_array().ok_or_else(|| {
            FaqSeekError::data_load(format!("Category '{}' must be a list of entries", category))
        })?;

        for (position, entry) in entries.iter().enumerate() {
            let id = RecordId::try_from(records.len()).map_err(|_| {
                FaqSeekError::data_load("Corpus has more entries than record ids can address")
            })?;

            records.push(FaqRecord {
                id,
                category: category.clone(),
                question: required_field(entry, "question", category, position)?,
                answer: required_field(entry, "answer", category, position)?,
            });
        }

        debug!("Category '{}': {} entries", category, entries.len());
    }

    Ok(records)
}

fn required_field(entry: &Value, field: &str, category: &str, position: usize) -> Result<String> {
    match entry.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(FaqSeekError::schema(format!(
            "Category '{}' item {}: '{}' must be a string",
            category, position, field
        ))),
        None => Err(FaqSeekError::schema(format!(
            "Category '{}' item {} is missing '{}'",
            category, position, field
        ))),
    }
}
