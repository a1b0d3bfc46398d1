/// API request handlers
use std::sync::Arc;

use axum::Json;

use crate::api::types::HealthResponse;
use crate::config::AppConfig;
use crate::config::AuthConfig;
use crate::config::RagConfig;
use crate::embeddings::EmbeddingService;
use crate::llm::ChatModel;
use crate::rag::CompanyResolver;
use crate::rag::RagService;
use crate::rag::Retriever;
use crate::rag::SessionStore;
use crate::resume::IngestService;
use crate::vector_store::VectorStore;

pub mod chat;
pub mod companies;
pub mod resumes;
pub mod search;

pub use chat::*;
pub use companies::*;
pub use resumes::*;
pub use search::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VectorStore>,
    pub ingest_service: Arc<IngestService>,
    pub retriever: Arc<Retriever>,
    pub rag_service: Arc<RagService>,
    pub auth: Arc<AuthConfig>,
    pub rag_config: Arc<RagConfig>,
}

impl AppState {
    /// Wire services from their collaborators
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn VectorStore>,
        embedding_service: Arc<EmbeddingService>,
        chat_model: Arc<dyn ChatModel>,
        resolver: Arc<dyn CompanyResolver>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let ingest_service = Arc::new(IngestService::new(
            embedding_service.clone(),
            store.clone(),
        ));
        let retriever = Arc::new(Retriever::new(store.clone(), embedding_service.clone()));
        let rag_service = Arc::new(RagService::new(
            embedding_service,
            store.clone(),
            resolver,
            chat_model,
            sessions,
            &config.rag,
        ));

        Self {
            store,
            ingest_service,
            retriever,
            rag_service,
            auth: Arc::new(config.auth.clone()),
            rag_config: Arc::new(config.rag.clone()),
        }
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
