//! Deterministic fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use getthatjob::config::AppConfig;
use getthatjob::embeddings::EmbedMode;
use getthatjob::embeddings::EmbeddingProvider;
use getthatjob::embeddings::EmbeddingService;
use getthatjob::llm::ChatModel;
use getthatjob::llm::ChatReply;
use getthatjob::llm::ChatTurn;
use getthatjob::models::EducationItem;
use getthatjob::models::ExperienceItem;
use getthatjob::models::ResumeRecord;
use getthatjob::models::ResumeVector;
use getthatjob::models::ScoredResume;
use getthatjob::models::StringList;
use getthatjob::rag::InMemorySessionStore;
use getthatjob::rag::KeywordCompanyResolver;
use getthatjob::rag::RagService;
use getthatjob::vector_store::normalize_stored_list;
use getthatjob::vector_store::MemoryVectorStore;
use getthatjob::vector_store::VectorStore;
use getthatjob::AppError;
use getthatjob::Result;
use serde_json::Value;

pub const DIM: usize = 64;

/// Bag-of-words embedder: each lowercase token is hashed into one of
/// `DIM` buckets and the result is L2-normalised.
#[derive(Default)]
pub struct HashEmbedder {
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            vector[fnv1a(&token) % DIM] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        } else {
            vector[0] = 1.0;
        }
        vector
    }
}

fn fnv1a(token: &str) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash as usize
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, texts: &[String], _mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "hash-bow"
    }
}

/// What the chat model was asked on one call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub history_len: usize,
    pub message: String,
}

/// Chat model that echoes a numbered answer, or fails when told to
#[derive(Default)]
pub struct CountingChatModel {
    calls: Mutex<Vec<RecordedCall>>,
    fail: bool,
}

impl CountingChatModel {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for CountingChatModel {
    async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<ChatReply> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                history_len: history.len(),
                message: message.to_string(),
            });
            calls.len()
        };
        if self.fail {
            return Err(AppError::ModelGeneration("model overloaded".to_string()));
        }

        let text = format!("Answer #{n}");
        let mut extended = history.to_vec();
        extended.push(ChatTurn::user(message));
        extended.push(ChatTurn::model(text.clone()));
        Ok(ChatReply {
            text,
            history: extended,
        })
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

/// Everything a pipeline test needs to inspect
pub struct Harness {
    pub service: RagService,
    pub store: Arc<MemoryVectorStore>,
    pub embeddings: Arc<EmbeddingService>,
    pub model: Arc<CountingChatModel>,
    pub sessions: Arc<InMemorySessionStore>,
}

pub fn harness(config: &AppConfig, model: CountingChatModel) -> Harness {
    let store = Arc::new(MemoryVectorStore::new(DIM));
    let embeddings = Arc::new(EmbeddingService::new(Arc::new(HashEmbedder::default())));
    let model = Arc::new(model);
    let sessions = Arc::new(InMemorySessionStore::new(config.rag.max_sessions));

    let service = RagService::new(
        embeddings.clone(),
        store.clone(),
        Arc::new(KeywordCompanyResolver),
        model.clone(),
        sessions.clone(),
        &config.rag,
    );

    Harness {
        service,
        store,
        embeddings,
        model,
        sessions,
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.embeddings.dimension = DIM;
    config.rag.max_context_window = 20_000;
    config
}

pub fn resume(name: &str, skills: &str, title: &str, company: &str) -> ResumeRecord {
    ResumeRecord {
        name: Some(name.to_string()),
        summary: Some(format!("{title} with a background at {company}")),
        skills: Some(StringList::Text(skills.to_string())),
        experience: Some(vec![ExperienceItem {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            duration: Some("3 years".to_string()),
            ..Default::default()
        }]),
        education: Some(vec![EducationItem {
            degree: Some("Bachelor of Science".to_string()),
            school: Some("State University".to_string()),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Store whose list fields can be overwritten with raw JSON, decoded on
/// every read the way database rows are
pub struct RawListStore {
    inner: MemoryVectorStore,
    raw: Mutex<HashMap<(String, &'static str), Value>>,
}

impl RawListStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: MemoryVectorStore::new(dimension),
            raw: Mutex::new(HashMap::new()),
        }
    }

    /// `field` is one of `skills`, `job_titles` or `companies`
    pub fn set_raw(&self, id: &str, field: &'static str, value: Value) {
        self.raw
            .lock()
            .unwrap()
            .insert((id.to_string(), field), value);
    }

    fn decode(&self, mut record: ResumeVector) -> ResumeVector {
        let raw = self.raw.lock().unwrap();
        for (field, target) in [
            ("skills", &mut record.skills),
            ("job_titles", &mut record.job_titles),
            ("companies", &mut record.companies),
        ] {
            if let Some(value) = raw.get(&(record.id.clone(), field)) {
                *target = normalize_stored_list(value, &record.id, field);
            }
        }
        record
    }
}

#[async_trait]
impl VectorStore for RawListStore {
    async fn ensure_collection(&self) -> Result<()> {
        self.inner.ensure_collection().await
    }

    async fn insert(&self, record: &ResumeVector) -> Result<()> {
        self.inner.insert(record).await
    }

    async fn search(
        &self,
        query: &[f32],
        target_company: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredResume>> {
        let hits = self.inner.search(query, target_company, limit).await?;
        Ok(hits
            .into_iter()
            .map(|hit| ScoredResume {
                record: self.decode(hit.record),
                score: hit.score,
            })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ResumeVector>> {
        Ok(self.inner.get(id).await?.map(|r| self.decode(r)))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ResumeVector>> {
        let records = self.inner.list_by_user(user_id).await?;
        Ok(records.into_iter().map(|r| self.decode(r)).collect())
    }

    async fn list_by_company(&self, target_company: &str) -> Result<Vec<ResumeVector>> {
        let records = self.inner.list_by_company(target_company).await?;
        Ok(records.into_iter().map(|r| self.decode(r)).collect())
    }

    async fn update_target_company(
        &self,
        id: &str,
        target_company: &str,
    ) -> Result<ResumeVector> {
        let record = self.inner.update_target_company(id, target_company).await?;
        Ok(self.decode(record))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn distinct_companies(&self) -> Result<Vec<String>> {
        self.inner.distinct_companies().await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
