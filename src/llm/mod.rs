// LLM completion module
// A narrow completion seam plus an OpenAI-compatible chat client

pub mod chat;

use anyhow::Result;

pub use chat::ChatClient;

/// Raw reply from a completion call; `content` is absent when the service sent no text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: Option<String>,
}

impl Completion {
    #[inline]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// A service that completes a single-string prompt
pub trait ChatModel {
    fn complete(&self, prompt: &str) -> Result<Completion>;
}

impl<L: ChatModel + ?Sized> ChatModel for &L {
    #[inline]
    fn complete(&self, prompt: &str) -> Result<Completion> {
        (**self).complete(prompt)
    }
}
