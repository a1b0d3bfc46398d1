//! Resume vector collection
//!
//! A single logical collection holds one [`ResumeVector`] per stored resume.
//! Two backends implement [`VectorStore`]: pgvector on Postgres for
//! deployments and a process-local store for development and tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
pub use memory::MemoryVectorStore;
pub use postgres::PgVectorStore;
use serde_json::Value;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::config::VectorBackend;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::ResumeVector;
use crate::models::ScoredResume;
use crate::resume::features::split_delimited;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection and its indexes if missing. Safe to call repeatedly.
    async fn ensure_collection(&self) -> Result<()>;

    async fn insert(&self, record: &ResumeVector) -> Result<()>;

    /// Top `limit` records by cosine similarity, highest first.
    ///
    /// `target_company` restricts hits to an exact match on that field.
    async fn search(
        &self,
        query: &[f32],
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>>;

    async fn get(&self, id: &str) -> Result<Option<ResumeVector>>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ResumeVector>>;

    async fn list_by_company(&self, target_company: &str) -> Result<Vec<ResumeVector>>;

    /// Replace the target company and refresh `created_at`.
    ///
    /// Fails with `NotFound` when `id` is unknown.
    async fn update_target_company(&self, id: &str, target_company: &str)
        -> Result<ResumeVector>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Sorted distinct non-empty target companies
    async fn distinct_companies(&self) -> Result<Vec<String>>;

    /// Dimension every stored vector must have
    fn dimension(&self) -> usize;
}

/// Open the backend selected by `vector_store.backend`
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.vector_store.backend {
        VectorBackend::Postgres => Arc::new(PgVectorStore::connect(config).await?),
        VectorBackend::Memory => {
            info!("Using in-memory vector store; records are lost on exit");
            Arc::new(MemoryVectorStore::new(config.embedding_dimension()))
        }
    };
    Ok(store)
}

pub(crate) fn check_dimension(record: &ResumeVector, dimension: usize) -> Result<()> {
    if record.vector.len() == dimension {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "vector dimension {} does not match collection dimension {dimension}",
            record.vector.len()
        )))
    }
}

/// Read a stored list field that may be a JSON array, a JSON-encoded array
/// string, or a delimited string.
///
/// Malformed values are logged and read as empty so one bad record does not
/// fail a whole search.
pub fn normalize_stored_list(value: &Value, record_id: &str, field: &str) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(inner @ Value::Array(_)) => {
                        normalize_stored_list(&inner, record_id, field)
                    }
                    _ => {
                        warn!("Malformed {} on record {}, treating as empty", field, record_id);
                        Vec::new()
                    }
                }
            } else {
                split_delimited(trimmed)
            }
        }
        other => {
            warn!(
                "Unexpected {} value on record {}: {}, treating as empty",
                field, record_id, other
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_array_is_read_as_is() {
        assert_eq!(
            normalize_stored_list(&json!(["Rust", " Go "]), "r1", "skills"),
            vec!["Rust", "Go"]
        );
    }

    #[test]
    fn test_json_encoded_string_is_decoded() {
        assert_eq!(
            normalize_stored_list(&json!("[\"React\",\"Node.js\"]"), "r1", "skills"),
            vec!["React", "Node.js"]
        );
    }

    #[test]
    fn test_delimited_string_is_split() {
        assert_eq!(
            normalize_stored_list(&json!("Python, Go; Rust|C++"), "r1", "skills"),
            vec!["Python", "Go", "Rust", "C++"]
        );
    }

    #[test]
    fn test_malformed_values_read_as_empty() {
        assert!(normalize_stored_list(&json!("[\"unterminated"), "r1", "skills").is_empty());
        assert!(normalize_stored_list(&json!({"a": 1}), "r1", "skills").is_empty());
        assert!(normalize_stored_list(&Value::Null, "r1", "skills").is_empty());
    }
}
