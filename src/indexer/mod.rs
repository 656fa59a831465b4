// Indexer module
// Loads documents, splits them, embeds the chunks and builds a fresh vector index


use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::documents::{Document, load_pdf_directory};
use crate::embeddings::chunking::{ChunkingConfig, split_documents};
use crate::embeddings::Embedder;
use crate::index::VectorIndex;

const DEFAULT_BATCH_SIZE: usize = 16;

/// Knobs for a single index build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingOptions {
    /// Documents kept after loading; `0` keeps every document
    pub max_documents: usize,
    pub chunking: ChunkingConfig,
}

impl Default for IndexingOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_documents: 20,
            chunking: ChunkingConfig::default(),
        }
    }
}

impl IndexingOptions {
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_documents: config.indexing.max_documents,
            chunking: config.chunking.clone(),
        }
    }
}

/// Statistics about one index build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingStats {
    pub documents_loaded: usize,
    pub documents_used: usize,
    pub chunks_created: usize,
    pub embeddings_generated: usize,
}

/// A freshly built index together with how it was produced
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub index: VectorIndex,
    pub stats: IndexingStats,
}

/// Builds vector indexes using an embedding service
pub struct Indexer<'a, E: Embedder + ?Sized> {
    embedder: &'a E,
    batch_size: usize,
}

impl<'a, E: Embedder + ?Sized> Indexer<'a, E> {
    #[inline]
    pub fn new(embedder: &'a E) -> Self {
        Self {
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Number of chunks sent to the embedder per call
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Load every PDF page in `source_dir` and index it
    #[inline]
    pub fn build(&self, source_dir: &Path, options: &IndexingOptions) -> Result<BuiltIndex> {
        info!("Building index from {}", source_dir.display());

        let documents = load_pdf_directory(source_dir)
            .with_context(|| format!("Failed to load documents from {}", source_dir.display()))?;

        self.build_from_documents(documents, options)
    }

    /// Truncate, split, embed and index already loaded documents
    #[inline]
    pub fn build_from_documents(
        &self,
        mut documents: Vec<Document>,
        options: &IndexingOptions,
    ) -> Result<BuiltIndex> {
        let documents_loaded = documents.len();
        if options.max_documents > 0 && documents.len() > options.max_documents {
            debug!(
                "Keeping the first {} of {} documents",
                options.max_documents, documents_loaded
            );
            documents.truncate(options.max_documents);
        }
        let documents_used = documents.len();

        let chunks = split_documents(&documents, &options.chunking);
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        let embeddings = self.embed_all(&texts)?;
        let embeddings_generated = embeddings.len();

        let index = VectorIndex::from_embeddings(chunks, embeddings)
            .context("Failed to build vector index")?;

        let stats = IndexingStats {
            documents_loaded,
            documents_used,
            chunks_created: index.len(),
            embeddings_generated,
        };

        info!(
            "Indexed {} chunks from {} of {} documents",
            stats.chunks_created, stats.documents_used, stats.documents_loaded
        );

        Ok(BuiltIndex { index, stats })
    }

    fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let bar = if console::user_attended_stderr() {
            ProgressBar::new(texts.len() as u64).with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding chunks {wide_bar}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self
                .embedder
                .embed_documents(batch)
                .with_context(|| format!("Failed to embed batch of {} chunks", batch.len()))?;
            embeddings.extend(vectors);
            bar.inc(batch.len() as u64);
        }

        bar.finish_and_clear();
        Ok(embeddings)
    }
}
