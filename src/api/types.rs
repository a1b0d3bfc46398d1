//! API request and response types

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::models::EducationLevel;
use crate::models::ResumeFeatures;
use crate::models::ResumeRecord;
use crate::models::ResumeVector;
use crate::models::ScoredResume;
use crate::rag::ClientMessage;
use crate::rag::CompanyInsights;

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizeRequest {
    #[serde(default)]
    pub resume_data: Option<ResumeRecord>,
    #[serde(default)]
    pub target_company: Option<String>,
    /// Only honoured for dev-mode user ids
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorizeResponse {
    pub success: bool,
    pub resume_id: String,
    pub vector_dimension: usize,
    pub features: ResumeFeatures,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResumeRequest {
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub target_company: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResumeResponse {
    pub success: bool,
    pub message: String,
    pub resume_id: String,
    pub target_company: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResumeResponse {
    pub success: bool,
    pub resume_id: String,
}

/// Stored resume as returned to clients; the vector itself is never sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeView {
    pub id: String,
    pub user_id: String,
    pub resume_text: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub education_level: EducationLevel,
    pub job_titles: Vec<String>,
    pub companies: Vec<String>,
    pub target_company: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl From<ResumeVector> for ResumeView {
    fn from(record: ResumeVector) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            resume_text: record.resume_text,
            skills: record.skills,
            experience_years: record.experience_years,
            education_level: record.education_level,
            job_titles: record.job_titles,
            companies: record.companies,
            target_company: record.target_company,
            created_at: record.created_at,
            score: None,
            distance: None,
        }
    }
}

impl From<ScoredResume> for ResumeView {
    fn from(hit: ScoredResume) -> Self {
        let distance = hit.distance();
        Self {
            score: Some(hit.score),
            distance: Some(distance),
            ..Self::from(hit.record)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub resumes: Vec<ResumeView>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub resume_data: Option<ResumeRecord>,
    #[serde(default)]
    pub target_company: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub query: Option<String>,
    pub target_company: Option<String>,
    pub results: Vec<ResumeView>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ClientMessage>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer: String,
    pub target_company: Option<String>,
    pub updated_chat_history: Vec<ClientMessage>,
    pub session_id: String,
    /// True when the model failed and `answer` is a fixed apology
    pub degraded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSessionResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompaniesResponse {
    pub companies: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsightsResponse {
    pub company_name: String,
    pub insights: CompanyInsights,
}
