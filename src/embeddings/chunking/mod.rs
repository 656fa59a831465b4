#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::documents::{Document, DocumentMetadata};

/// Separators tried in order, from paragraph breaks down to single characters
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chunk text
    pub content: String,
    /// Metadata of the document this chunk was cut from
    pub metadata: DocumentMetadata,
    /// The index of this chunk within its document
    pub chunk_index: usize,
}

/// Configuration for splitting documents into chunks. Sizes are in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split every document into chunks, keeping document order
#[inline]
pub fn split_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<TextChunk> {
    let mut chunks = Vec::new();

    for document in documents {
        let pieces = split_text(&document.content, config);
        chunks.extend(
            pieces
                .into_iter()
                .enumerate()
                .map(|(chunk_index, content)| TextChunk {
                    content,
                    metadata: document.metadata.clone(),
                    chunk_index,
                }),
        );
    }

    debug!(
        "Split {} documents into {} chunks (avg {} chars)",
        documents.len(),
        chunks.len(),
        chunks.iter().map(|c| char_len(&c.content)).sum::<usize>() / chunks.len().max(1)
    );

    chunks
}

/// Split text recursively: use the first separator that occurs in the text,
/// merge the resulting pieces up to `chunk_size`, and split oversized pieces
/// again with the remaining separators.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    split_recursive(text, &DEFAULT_SEPARATORS, config)
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkingConfig) -> Vec<String> {
    let mut final_chunks = Vec::new();

    let (separator, remaining) = pick_separator(text, separators);
    let splits = split_keeping_separator(text, separator);

    let mut good_splits: Vec<String> = Vec::new();
    for split in splits {
        if char_len(&split) < config.chunk_size {
            good_splits.push(split);
            continue;
        }

        if !good_splits.is_empty() {
            final_chunks.extend(merge_splits(&good_splits, config));
            good_splits.clear();
        }

        if remaining.is_empty() {
            if !split.trim().is_empty() {
                final_chunks.push(split);
            }
        } else {
            final_chunks.extend(split_recursive(&split, remaining, config));
        }
    }

    if !good_splits.is_empty() {
        final_chunks.extend(merge_splits(&good_splits, config));
    }

    final_chunks
}

fn pick_separator<'a, 's>(text: &str, separators: &'s [&'a str]) -> (&'a str, &'s [&'a str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator, &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }

    ("", &[])
}

/// Split on `separator`, attaching each separator to the start of the piece after it.
/// The empty separator yields single characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut splits = Vec::new();
    let mut current = String::new();
    for (i, piece) in text.split(separator).enumerate() {
        if i > 0 {
            if !current.is_empty() {
                splits.push(std::mem::take(&mut current));
            }
            current.push_str(separator);
        }
        current.push_str(piece);
    }
    if !current.is_empty() {
        splits.push(current);
    }

    splits
}

/// Greedily pack pieces into chunks of at most `chunk_size` characters.
/// When a chunk is emitted, pieces are dropped from the front until at most
/// `chunk_overlap` characters remain to start the next chunk.
fn merge_splits(splits: &[String], config: &ChunkingConfig) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0;

    for split in splits {
        let len = char_len(split);

        if total + len > config.chunk_size && !current.is_empty() {
            push_joined(&mut docs, current.iter().map(|(s, _)| *s));

            while total > config.chunk_overlap || (total + len > config.chunk_size && total > 0) {
                match current.pop_front() {
                    Some((_, dropped)) => total -= dropped,
                    None => break,
                }
            }
        }

        current.push_back((split, len));
        total += len;
    }

    push_joined(&mut docs, current.iter().map(|(s, _)| *s));
    docs
}

fn push_joined<'a>(docs: &mut Vec<String>, pieces: impl Iterator<Item = &'a str>) {
    let joined: String = pieces.collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Length in characters, the unit chunk sizes are measured in
#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
