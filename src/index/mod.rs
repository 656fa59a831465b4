// In-memory vector index
// Brute-force cosine similarity over (chunk, vector) entries

#[cfg(test)]
mod tests;

use anyhow::Context;
use tracing::{debug, info};

use crate::DocsQaError;
use crate::embeddings::{Embedder, TextChunk};

/// Number of chunks retrieved per question when nothing else is configured
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    chunk: TextChunk,
    vector: Vec<f32>,
    magnitude: f32,
}

/// Searchable mapping from embedding vectors to the chunks they represent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

/// Search result from vector similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: TextChunk,
    pub similarity_score: f32,
}

impl VectorIndex {
    /// Pair each chunk with its embedding.
    /// All vectors must be non-empty and share one dimension.
    #[inline]
    pub fn from_embeddings(
        chunks: Vec<TextChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, DocsQaError> {
        if chunks.len() != embeddings.len() {
            return Err(DocsQaError::Index(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut index = Self::default();
        for (chunk, vector) in chunks.into_iter().zip(embeddings) {
            index.insert(chunk, vector)?;
        }

        info!(
            "Built vector index with {} entries ({} dimensions)",
            index.len(),
            index.dimension.unwrap_or(0)
        );
        Ok(index)
    }

    fn insert(&mut self, chunk: TextChunk, vector: Vec<f32>) -> Result<(), DocsQaError> {
        if vector.is_empty() {
            return Err(DocsQaError::Index(format!(
                "Empty embedding for chunk {} of {}",
                chunk.chunk_index,
                chunk.metadata.describe()
            )));
        }

        match self.dimension {
            Some(dim) if dim != vector.len() => {
                return Err(DocsQaError::Index(format!(
                    "Vector dimension mismatch: expected {}, got {}",
                    dim,
                    vector.len()
                )));
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }

        let magnitude = magnitude(&vector);
        self.entries.push(IndexEntry {
            chunk,
            vector,
            magnitude,
        });
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Iterate over the indexed chunks and their vectors in insertion order
    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = (&TextChunk, &[f32])> {
        self.entries
            .iter()
            .map(|entry| (&entry.chunk, entry.vector.as_slice()))
    }

    /// Return the `limit` chunks most similar to `query_vector`, best first.
    /// Equal scores keep insertion order.
    #[inline]
    pub fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, DocsQaError> {
        if self.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        match self.dimension {
            Some(dim) if dim != query_vector.len() => {
                return Err(DocsQaError::Index(format!(
                    "Query dimension mismatch: expected {}, got {}",
                    dim,
                    query_vector.len()
                )));
            }
            _ => {}
        }

        let query_magnitude = magnitude(query_vector);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                (
                    i,
                    cosine_similarity(&entry.vector, query_vector, entry.magnitude, query_magnitude),
                )
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        debug!(
            "Vector search returned {} of {} entries",
            scored.len(),
            self.len()
        );

        Ok(scored
            .into_iter()
            .map(|(i, similarity_score)| SearchResult {
                chunk: self.entries[i].chunk.clone(),
                similarity_score,
            })
            .collect())
    }

    /// Bind this index to an embedder for text queries
    #[inline]
    pub fn as_retriever<'a, E: Embedder + ?Sized>(
        &'a self,
        embedder: &'a E,
        top_k: usize,
    ) -> Retriever<'a, E> {
        Retriever {
            index: self,
            embedder,
            top_k,
        }
    }
}

/// Retrieves the chunks most relevant to a query text
pub struct Retriever<'a, E: Embedder + ?Sized> {
    index: &'a VectorIndex,
    embedder: &'a E,
    top_k: usize,
}

impl<E: Embedder + ?Sized> Retriever<'_, E> {
    /// Embed `query` and search the index. An empty index is searched without embedding.
    #[inline]
    pub fn retrieve(&self, query: &str) -> crate::Result<Vec<SearchResult>> {
        if self.index.is_empty() {
            debug!("Index is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed_query(query)
            .context("Failed to embed query")
            .map_err(|e| DocsQaError::Embedding(format!("{:#}", e)))?;

        self.index.search_similar(&query_vector, self.top_k)
    }
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with precomputed magnitudes; zero vectors score 0
fn cosine_similarity(a: &[f32], b: &[f32], mag_a: f32, mag_b: f32) -> f32 {
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (mag_a * mag_b)
}
