
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{ChatModel, Completion};
use crate::config::{ApiKey, Config};
use crate::http::{DEFAULT_RETRY_ATTEMPTS, agent_with_timeout, send_with_retry};

/// Client for an OpenAI-compatible `chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: Url,
    model: String,
    max_tokens: u32,
    api_key: Option<ApiKey>,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .llm
            .chat_url()
            .context("Failed to build chat completion URL from config")?;

        let api_key = config.credentials.llm_api_key.clone();
        if api_key.is_none() {
            warn!("No LLM API key configured; requests to {} are unauthenticated", endpoint);
        }

        Ok(Self {
            endpoint,
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            api_key,
            agent: agent_with_timeout(Duration::from_secs(config.llm.timeout_seconds)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatModel for ChatClient {
    fn complete(&self, prompt: &str) -> Result<Completion> {
        debug!(
            "Requesting completion from {} (prompt length: {})",
            self.model,
            prompt.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize completion request")?;

        let response_text = send_with_retry(self.endpoint.as_str(), self.retry_attempts, || {
            let mut request = self
                .agent
                .post(self.endpoint.as_str())
                .header("Content-Type", "application/json");
            if let Some(key) = &self.api_key {
                request = request.header("Authorization", format!("Bearer {}", key.expose()));
            }
            request
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to request completion")?;

        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse completion response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        if content.is_none() {
            warn!("Completion response from {} had no content", self.model);
        }

        Ok(Completion { content })
    }
}
