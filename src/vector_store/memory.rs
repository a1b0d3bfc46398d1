use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::check_dimension;
use super::VectorStore;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::ResumeVector;
use crate::models::ScoredResume;

/// Brute-force cosine store kept in process memory.
///
/// Records are kept in insertion order. Update replaces the record under a
/// single write lock, so readers never observe it missing.
pub struct MemoryVectorStore {
    records: RwLock<Vec<ResumeVector>>,
    dimension: usize,
}

impl MemoryVectorStore {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            dimension,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_collection(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, record: &ResumeVector) -> Result<()> {
        check_dimension(record, self.dimension)?;
        self.records.write().await.push(record.clone());
        debug!("Stored resume {} in memory", record.id);
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>> {
        if query.len() != self.dimension {
            return Err(AppError::Validation(format!(
                "query dimension {} does not match collection dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let records = self.records.read().await;
        let mut scored: Vec<ScoredResume> = records
            .iter()
            .filter(|r| target_company.map_or(true, |c| r.target_company == c))
            .map(|r| ScoredResume {
                score: cosine_similarity(query, &r.vector),
                record: r.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get(&self, id: &str) -> Result<Option<ResumeVector>> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ResumeVector>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_company(&self, target_company: &str) -> Result<Vec<ResumeVector>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.target_company == target_company)
            .cloned()
            .collect())
    }

    async fn update_target_company(
        &self,
        id: &str,
        target_company: &str,
    ) -> Result<ResumeVector> {
        let mut records = self.records.write().await;
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("resume {id}")))?;

        let mut record = records.remove(pos);
        record.target_company = target_company.to_string();
        record.created_at = Utc::now();
        records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn distinct_companies(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let companies: BTreeSet<&str> = records
            .iter()
            .map(|r| r.target_company.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(companies.into_iter().map(str::to_string).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
