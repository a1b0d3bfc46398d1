//! Similarity search over stored resumes

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::EmbeddingService;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::ResumeRecord;
use crate::models::ScoredResume;
use crate::resume::prepare_resume_text;
use crate::vector_store::VectorStore;

/// Embeds a query or a resume and searches the collection
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedding_service: Arc<EmbeddingService>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, embedding_service: Arc<EmbeddingService>) -> Self {
        Self {
            store,
            embedding_service,
        }
    }

    /// Search with a free-text query embedded in query mode
    pub async fn search_by_query(
        &self,
        query: &str,
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>> {
        debug!("Performing semantic search: {}", query);
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Missing query".to_string()));
        }

        let embedding = self.embedding_service.embed_query(query).await?;
        self.store.search(&embedding, target_company, limit).await
    }

    /// Find resumes similar to `resume`, embedded the way stored resumes are
    pub async fn search_by_resume(
        &self,
        resume: &ResumeRecord,
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>> {
        let text = prepare_resume_text(resume);
        if text.trim().is_empty() {
            return Err(AppError::Validation("Resume data is empty".to_string()));
        }
        debug!("Performing resume similarity search ({} chars)", text.len());

        let embedding = self.embedding_service.embed_document(&text).await?;
        self.store.search(&embedding, target_company, limit).await
    }
}
