// Embeddings module
// Chunking of document text and the embedding service client

pub mod chunking;
pub mod ollama;

use anyhow::Result;

pub use chunking::{ChunkingConfig, TextChunk, split_documents, split_text};
pub use ollama::OllamaClient;

/// A service that turns text into fixed-dimension vectors
pub trait Embedder {
    /// Embed a batch of texts, returning one vector per input in the same order
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    #[inline]
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_documents(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding service returned no vector for the query"))
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    #[inline]
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_documents(texts)
    }

    #[inline]
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_query(text)
    }
}
