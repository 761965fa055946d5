//! FaqSeek Embedding Providers
//!
//! Text -> vector encoders behind a common trait, plus the loader that
//! builds the configured one.

mod client;
#[cfg(feature = "fastembed")]
mod local;
mod provider;
mod types;

pub use client::OllamaEmbedder;
#[cfg(feature = "fastembed")]
pub use local::FastEmbedder;
pub use provider::{ConfiguredLoader, Embedder, EmbedderLoader, PROBE_TEXT};
pub use types::{EmbedRequest, EmbedResponse};
