use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::extract_features;
use super::prepare_resume_text;
use crate::embeddings::EmbeddingService;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::ResumeFeatures;
use crate::models::ResumeRecord;
use crate::models::ResumeVector;
use crate::vector_store::VectorStore;

/// Result of storing one resume
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub resume_id: String,
    pub vector_dimension: usize,
    pub features: ResumeFeatures,
}

/// Flattens, embeds and stores resumes
pub struct IngestService {
    embeddings: Arc<EmbeddingService>,
    store: Arc<dyn VectorStore>,
}

impl IngestService {
    pub fn new(embeddings: Arc<EmbeddingService>, store: Arc<dyn VectorStore>) -> Self {
        Self { embeddings, store }
    }

    /// Store `resume` for `user_id`, tagged with `target_company` (may be empty)
    pub async fn ingest(
        &self,
        resume: &ResumeRecord,
        target_company: &str,
        user_id: &str,
    ) -> Result<IngestOutcome> {
        let resume_text = prepare_resume_text(resume);
        if resume_text.trim().is_empty() {
            return Err(AppError::Validation("Resume data is empty".to_string()));
        }

        self.store.ensure_collection().await?;

        let features = extract_features(resume);
        let vector = self.embeddings.embed_document(&resume_text).await?;
        let vector_dimension = vector.len();

        let record = ResumeVector::new(
            user_id,
            resume_text,
            features.clone(),
            target_company.trim(),
            vector,
        );
        self.store.insert(&record).await?;

        info!(
            "Vectorized resume {} for user {} (target company {:?}, {} skills)",
            record.id,
            user_id,
            record.target_company,
            features.skills.len()
        );

        Ok(IngestOutcome {
            resume_id: record.id,
            vector_dimension,
            features,
        })
    }
}
