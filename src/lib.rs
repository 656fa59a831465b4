use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocsQaError>;

#[derive(Error, Debug)]
pub enum DocsQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document loading error: {0}")]
    Loader(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod answerer;
pub mod commands;
pub mod config;
pub mod documents;
pub mod embeddings;
pub mod http;
pub mod index;
pub mod indexer;
pub mod llm;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
