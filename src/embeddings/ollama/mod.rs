
use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::Embedder;
use crate::config::{ApiKey, Config};
use crate::http::{DEFAULT_RETRY_ATTEMPTS, agent_with_timeout, send_with_retry};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    model: String,
    batch_size: u32,
    api_key: Option<ApiKey>,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    #[serde(rename = "input")]
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .context("Failed to generate Ollama URL from config")?;

        Ok(Self {
            base_url,
            model: config.embedding.model.clone(),
            batch_size: config.embedding.batch_size.max(1),
            api_key: config.credentials.embedding_api_key.clone(),
            agent: agent_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent_with_timeout(timeout);
        self
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

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size as usize
    }

    /// Check that the server answers and serves the configured model
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        self.validate_model()
            .with_context(|| format!("Ollama at {} is not usable", self.base_url))?;
        info!("Ollama at {} serves {}", self.base_url, self.model);
        Ok(())
    }

    #[inline]
    pub fn ping(&self) -> Result<()> {
        self.list_models().map(drop)
    }

    #[inline]
    pub fn validate_model(&self) -> Result<()> {
        let models = self.list_models()?;
        if models.iter().any(|m| m.name == self.model) {
            return Ok(());
        }

        let available = models.iter().map(|m| m.name.as_str()).join(", ");
        warn!("Embedding model {} not pulled; found [{}]", self.model, available);
        Err(anyhow::anyhow!(
            "Model '{}' is not available (installed: {})",
            self.model,
            available
        ))
    }

    /// Models installed on the server, from `GET /api/tags`
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("/api/tags")?;
        let body = send_with_retry(url.as_str(), self.retry_attempts, || {
            self.authorized(self.agent.get(url.as_str()))
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to list Ollama models")?;

        let tags: ModelsResponse =
            serde_json::from_str(&body).context("Unexpected /api/tags response")?;
        debug!("Ollama reports {} models", tags.models.len());
        Ok(tags.models)
    }

    /// Embed `texts`, at most `batch_size` per request, preserving order
    #[inline]
    pub fn generate_embeddings_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (n, batch) in texts.chunks(self.batch_size()).enumerate() {
            let embedded = self
                .embed_request(batch)
                .with_context(|| format!("Embedding request {} ({} texts) failed", n + 1, batch.len()))?;
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    fn embed_request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = self.endpoint("/api/embed")?;
        let payload = serde_json::to_string(&EmbedRequest {
            model: &self.model,
            inputs,
        })
        .context("Failed to encode embedding request")?;

        let body = send_with_retry(url.as_str(), self.retry_attempts, || {
            self.authorized(self.agent.post(url.as_str()))
                .header("Content-Type", "application/json")
                .send(&payload)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        let EmbedResponse { embeddings } =
            serde_json::from_str(&body).context("Unexpected /api/embed response")?;
        if embeddings.len() != inputs.len() {
            return Err(anyhow::anyhow!(
                "Mismatch: sent {} texts, received {} embeddings",
                inputs.len(),
                embeddings.len()
            ));
        }

        debug!(
            "Embedded {} texts into {} dimensions",
            embeddings.len(),
            embeddings.first().map_or(0, Vec::len)
        );
        Ok(embeddings)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid Ollama endpoint {}", path))
    }

    fn authorized<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key.expose())),
            None => request,
        }
    }
}

impl Embedder for OllamaClient {
    #[inline]
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_embeddings_batch(texts)
    }
}
