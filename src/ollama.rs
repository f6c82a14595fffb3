//! Ollama embedding provider using the local Ollama embeddings API.
//!
//! This module is only available when the `ollama` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default embedding model.
const DEFAULT_MODEL: &str = "nomic-embed-text";

/// The default dimensionality for `nomic-embed-text`.
const DEFAULT_DIMENSIONS: usize = 768;

/// An [`EmbeddingProvider`] backed by a local Ollama server.
///
/// Uses `reqwest` to call the `/api/embeddings` endpoint directly. Ollama
/// embeds one prompt per request, so batches go through the sequential
/// default of [`embed_batch`](EmbeddingProvider::embed_batch).
///
/// An unreachable server or missing model surfaces as
/// [`RagError::ModelUnavailable`], which the retrieval engine turns into a
/// degraded (unranked) search instead of a failed one.
///
/// # Configuration
///
/// - `base_url` – from the constructor or the `OLLAMA_BASE_URL` environment
///   variable; defaults to `http://localhost:11434`.
/// - `model` – defaults to `nomic-embed-text`; `OLLAMA_EMBED_MODEL` overrides
///   it in [`from_env`](OllamaEmbedder::from_env).
///
/// # Example
///
/// ```rust,ignore
/// use docrag::ollama::OllamaEmbedder;
///
/// let provider = OllamaEmbedder::new("http://localhost:11434");
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new provider for the given server address.
    ///
    /// Uses the default model (`nomic-embed-text`) and dimensions (768).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create a new provider from `OLLAMA_BASE_URL` and `OLLAMA_EMBED_MODEL`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let provider = Self::new(base_url);
        match std::env::var("OLLAMA_EMBED_MODEL") {
            Ok(model) if !model.is_empty() => provider.with_model(model),
            _ => provider,
        }
    }

    /// Set the model name (e.g. `mxbai-embed-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the dimensionality reported by
    /// [`dimensions()`](EmbeddingProvider::dimensions) to match the model.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Ollama", model = %self.model, text_len = text.len(), "embedding text");

        let request_body = EmbeddingsRequest { model: &self.model, prompt: text };
        let url = format!("{}/api/embeddings", self.base_url);

        let response =
            self.client.post(&url).json(&request_body).send().await.map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                if e.is_connect() || e.is_timeout() {
                    RagError::ModelUnavailable {
                        provider: "Ollama".into(),
                        message: format!("server unreachable at {}: {e}", self.base_url),
                    }
                } else {
                    RagError::EmbeddingError {
                        provider: "Ollama".into(),
                        message: format!("request failed: {e}"),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = "Ollama", %status, "API error");
            // 404 means the model is not pulled: the backend as configured
            // cannot embed anything, which is the degraded-mode condition.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(RagError::ModelUnavailable {
                    provider: "Ollama".into(),
                    message: format!("model '{}' not available: {detail}", self.model),
                });
            }
            return Err(RagError::EmbeddingError {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embeddings_response: EmbeddingsResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: "Ollama".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(embeddings_response.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
