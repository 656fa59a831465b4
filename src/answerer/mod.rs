// Answerer module
// Produces grounded and ungrounded answers for one question


use anyhow::Context;
use itertools::Itertools;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::embeddings::Embedder;
use crate::index::{SearchResult, VectorIndex};
use crate::llm::ChatModel;
use crate::{DocsQaError, Result};

const NO_GROUNDED_ANSWER: &str = "No answer generated.";
const NO_GENERAL_ANSWER: &str = "No response content.";
const PLACEHOLDER: &str = "Error generating response.";

/// One answer to a question
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Wall-clock time spent producing the answer
    pub elapsed: Option<Duration>,
    /// Chunks the answer was grounded on; empty for general answers
    pub context: Vec<SearchResult>,
}

impl Answer {
    /// Shown in place of an answer that failed
    #[inline]
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            elapsed: None,
            context: Vec::new(),
        }
    }
}

/// Both answers to one question. Either may fail without affecting the other.
#[derive(Debug)]
pub struct Responses {
    pub with_context: Result<Answer>,
    pub without_context: Result<Answer>,
}

#[inline]
pub fn grounded_prompt(context: &str, question: &str) -> String {
    format!(
        "\n    <context>\n    {}\n    <context>\n    Questions: {}\n    ",
        context, question
    )
}

#[inline]
pub fn general_prompt(question: &str) -> String {
    format!(
        "Answer the following question as accurately as possible: {}",
        question
    )
}

/// Wires an embedder and a chat model together for question answering
pub struct Answerer<'a, E: Embedder + ?Sized, L: ChatModel + ?Sized> {
    embedder: &'a E,
    llm: &'a L,
    top_k: usize,
}

impl<'a, E: Embedder + ?Sized, L: ChatModel + ?Sized> Answerer<'a, E, L> {
    #[inline]
    pub fn new(embedder: &'a E, llm: &'a L, top_k: usize) -> Self {
        Self {
            embedder,
            llm,
            top_k,
        }
    }

    /// Retrieve the closest chunks from `index` and answer from them
    #[inline]
    pub fn answer_with_context(&self, question: &str, index: &VectorIndex) -> Result<Answer> {
        let start = Instant::now();

        let context = index
            .as_retriever(self.embedder, self.top_k)
            .retrieve(question)?;
        debug!("Retrieved {} chunks for question", context.len());

        let joined = context.iter().map(|r| r.chunk.content.as_str()).join("\n\n");
        let prompt = grounded_prompt(&joined, question);

        let completion = self
            .llm
            .complete(&prompt)
            .context("Grounded completion failed")
            .map_err(|e| DocsQaError::Completion(format!("{:#}", e)))?;

        let elapsed = start.elapsed();
        info!("Grounded answer took {:.2?}", elapsed);

        Ok(Answer {
            text: completion
                .content
                .unwrap_or_else(|| NO_GROUNDED_ANSWER.to_string()),
            elapsed: Some(elapsed),
            context,
        })
    }

    /// Ask the chat model directly, with no retrieved context
    #[inline]
    pub fn answer_without_context(&self, question: &str) -> Result<Answer> {
        let start = Instant::now();

        let completion = self
            .llm
            .complete(&general_prompt(question))
            .context("General completion failed")
            .map_err(|e| DocsQaError::Completion(format!("{:#}", e)))?;

        let elapsed = start.elapsed();
        info!("General answer took {:.2?}", elapsed);

        Ok(Answer {
            text: completion
                .content
                .unwrap_or_else(|| NO_GENERAL_ANSWER.to_string()),
            elapsed: Some(elapsed),
            context: Vec::new(),
        })
    }

    #[inline]
    pub fn answer_both(&self, question: &str, index: &VectorIndex) -> Responses {
        Responses {
            with_context: self.answer_with_context(question, index),
            without_context: self.answer_without_context(question),
        }
    }
}
