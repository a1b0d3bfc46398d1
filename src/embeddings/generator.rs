//! Embedding generation service with batch processing

use std::sync::Arc;

use futures::stream::StreamExt;
use futures::stream::TryStreamExt;
use tracing::debug;

use super::client::EmbeddingClient;
use super::EmbedMode;
use super::EmbeddingProvider;
use super::MAX_BATCH_SIZE;
use crate::errors::AppError;
use crate::errors::Result;

/// Provider requests in flight for one batch
const CHUNK_CONCURRENCY: usize = 4;

/// Embeds resumes and queries through a provider, checking dimensions
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingService {
    /// Wrap an existing provider
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Build the HTTP-backed service from application config
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let client = EmbeddingClient::new(&config.embeddings)?;
        Ok(Self::new(Arc::new(client)).with_batch_size(config.embeddings.batch_size))
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Embed one resume text for storage
    pub async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text, EmbedMode::Document).await
    }

    /// Embed one question or search query
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text, EmbedMode::Query).await
    }

    async fn embed_one(&self, text: &str, mode: EmbedMode) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()], mode).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding in response".to_string()))
    }

    /// Embed many texts, chunked to the provider's batch limit.
    ///
    /// Chunks are requested concurrently; output order matches input order.
    pub async fn embed_batch(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(pos) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(AppError::Embedding(format!(
                "cannot embed empty text at position {pos}"
            )));
        }

        let chunk_futures: Vec<_> = texts
            .chunks(self.batch_size)
            .map(|chunk| self.embed_chunk(chunk, mode))
            .collect();
        let embeddings: Vec<Vec<f32>> = futures::stream::iter(chunk_futures)
            .buffered(CHUNK_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .flatten()
            .collect();

        let expected = self.dimension();
        if let Some(bad) = embeddings.iter().find(|v| v.len() != expected) {
            return Err(AppError::Embedding(format!(
                "embedding dimension {} does not match configured dimension {expected}",
                bad.len()
            )));
        }

        Ok(embeddings)
    }

    async fn embed_chunk(&self, chunk: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding chunk of {} texts ({:?})", chunk.len(), mode);
        let vectors = self.provider.embed(chunk, mode).await?;
        if vectors.len() != chunk.len() {
            return Err(AppError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunk.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    /// Get the embedding dimension
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Get the model name
    #[must_use]
    pub fn model(&self) -> &str {
        self.provider.model_name()
    }
}
