//! Embeddings generation module
//!
//! Text is embedded in one of two modes: resumes are embedded as documents,
//! chat questions and search queries as queries. The mode only changes the
//! hint sent to the provider; both land in the same vector space.
//!
//! # Examples
//!
//! ```rust,no_run
//! use getthatjob::config::AppConfig;
//! use getthatjob::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::from_app_config(&config)?;
//!
//!     let embedding = service.embed_query("senior rust engineer").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use generator::EmbeddingService;

use crate::errors::Result;

/// Maximum number of texts sent to the provider in one request
pub const MAX_BATCH_SIZE: usize = 96;

/// Whether text is embedded for storage or for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Document,
    Query,
}

impl EmbedMode {
    /// Provider-side `input_type` value
    #[must_use]
    pub const fn input_type(self) -> &'static str {
        match self {
            Self::Document => "search_document",
            Self::Query => "search_query",
        }
    }
}

/// A remote or local embedding model
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`, returning one vector per input in input order
    async fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}
