// Deterministic stand-ins for the embedding and completion services

use anyhow::Result;
use std::cell::{Cell, RefCell};

use crate::documents::{Document, DocumentMetadata};
use crate::embeddings::Embedder;
use crate::llm::{ChatModel, Completion};

/// Embeds text as its letter frequencies, so texts sharing words land close together
#[derive(Debug, Default)]
pub(crate) struct LetterEmbedder {
    pub(crate) calls: Cell<usize>,
}

impl LetterEmbedder {
    pub(crate) fn vector(text: &str) -> Vec<f32> {
        let mut counts = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            let slot = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            counts[slot] += 1.0;
        }
        counts
    }
}

impl Embedder for LetterEmbedder {
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.set(self.calls.get() + 1);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Embedder whose every call fails
#[derive(Debug, Default)]
pub(crate) struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("embedding service unavailable"))
    }
}

/// Records every prompt and replies with a fixed answer.
/// Prompts containing `fail_on` fail instead.
#[derive(Debug, Default)]
pub(crate) struct ScriptedChatModel {
    pub(crate) prompts: RefCell<Vec<String>>,
    pub(crate) reply: Option<String>,
    pub(crate) fail_on: Option<String>,
}

impl ScriptedChatModel {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn failing_on(reply: &str, marker: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            fail_on: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn recorded(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl ChatModel for ScriptedChatModel {
    fn complete(&self, prompt: &str) -> Result<Completion> {
        self.prompts.borrow_mut().push(prompt.to_string());
        if self
            .fail_on
            .as_deref()
            .is_some_and(|marker| prompt.contains(marker))
        {
            return Err(anyhow::anyhow!("rate limit exceeded"));
        }
        Ok(Completion {
            content: self.reply.clone(),
        })
    }
}

pub(crate) fn document(content: &str, page: u32) -> Document {
    Document {
        content: content.to_string(),
        metadata: DocumentMetadata {
            source: "physics.pdf".into(),
            page,
        },
    }
}
