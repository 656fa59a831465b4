// Session module
// Owns the services and the document index for one interactive session


use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::answerer::{Answerer, Responses};
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::index::{DEFAULT_TOP_K, VectorIndex};
use crate::indexer::{Indexer, IndexingOptions, IndexingStats};
use crate::llm::ChatModel;

/// Everything a session needs to know to build its index and answer questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub source_dir: PathBuf,
    pub options: IndexingOptions,
    pub top_k: usize,
    pub batch_size: usize,
}

impl Default for SessionSettings {
    #[inline]
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./data"),
            options: IndexingOptions::default(),
            top_k: DEFAULT_TOP_K,
            batch_size: 16,
        }
    }
}

impl SessionSettings {
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: config.indexing.data_dir.clone(),
            options: IndexingOptions::from_config(config),
            top_k: config.indexing.top_k,
            batch_size: config.embedding.batch_size as usize,
        }
    }
}

/// Result of asking a session to initialize its index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Built(IndexingStats),
    AlreadyInitialized,
}

pub struct Session<E: Embedder, L: ChatModel> {
    embedder: E,
    llm: L,
    settings: SessionSettings,
    index: Option<VectorIndex>,
}

impl<E: Embedder, L: ChatModel> Session<E, L> {
    #[inline]
    pub fn new(embedder: E, llm: L, settings: SessionSettings) -> Self {
        Self {
            embedder,
            llm,
            settings,
            index: None,
        }
    }

    #[inline]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[inline]
    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    #[inline]
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Build the index unless one already exists.
    /// On failure the session stays without an index.
    #[inline]
    pub fn initialize_index(&mut self) -> anyhow::Result<IndexOutcome> {
        if self.index.is_some() {
            info!("Document index already initialized");
            return Ok(IndexOutcome::AlreadyInitialized);
        }

        let stats = self.build()?;
        Ok(IndexOutcome::Built(stats))
    }

    /// Discard the current index and build a new one
    #[inline]
    pub fn rebuild_index(&mut self) -> anyhow::Result<IndexingStats> {
        self.clear_index();
        self.build()
    }

    fn build(&mut self) -> anyhow::Result<IndexingStats> {
        let built = Indexer::new(&self.embedder)
            .with_batch_size(self.settings.batch_size)
            .build(&self.settings.source_dir, &self.settings.options)
            .inspect_err(|e| error!("Failed to initialize document index: {:#}", e))?;

        self.index = Some(built.index);
        Ok(built.stats)
    }

    #[inline]
    pub fn clear_index(&mut self) {
        if self.index.take().is_some() {
            info!("Document index cleared");
        }
    }

    /// Answer with and without retrieved context.
    /// Returns `None` without contacting any service when there is no index or the question is blank.
    #[inline]
    pub fn ask(&self, question: &str) -> Option<Responses> {
        if question.trim().is_empty() {
            return None;
        }
        let Some(index) = self.index.as_ref() else {
            warn!("Question asked before the document index was initialized");
            return None;
        };

        let answerer = Answerer::new(&self.embedder, &self.llm, self.settings.top_k);
        Some(answerer.answer_both(question, index))
    }
}
