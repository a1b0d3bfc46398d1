/// Similarity search handler
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::auth::Identity;
use crate::api::types::ResumeView;
use crate::api::types::SearchRequest;
use crate::api::types::SearchResponse;
use crate::config::RagConfig;
use crate::errors::AppError;
use crate::errors::Result;

/// Search resumes by query text or by example resume (POST /api/search-resumes)
pub async fn search_resumes(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    identity.allow_dev_mode(req.dev_mode, &state.auth)?;

    let limit = effective_limit(req.limit, &state.rag_config);
    let target_company = req
        .target_company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let query = req
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let hits = match (&req.resume_data, &query) {
        (Some(resume), _) => {
            info!("POST /api/search-resumes by resume (limit {})", limit);
            state
                .retriever
                .search_by_resume(resume, target_company.as_deref(), limit)
                .await?
        }
        (None, Some(query)) => {
            info!("POST /api/search-resumes: {} (limit {})", query, limit);
            state
                .retriever
                .search_by_query(query, target_company.as_deref(), limit)
                .await?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either query or resumeData is required".to_string(),
            ))
        }
    };

    let results: Vec<ResumeView> = hits.into_iter().map(ResumeView::from).collect();
    Ok(Json(SearchResponse {
        success: true,
        query,
        target_company,
        count: results.len(),
        results,
    }))
}

/// Requested limit, defaulted and clamped to `[1, search_max_limit]`
fn effective_limit(requested: Option<i64>, config: &RagConfig) -> usize {
    let max = config.search_max_limit.max(1);
    match requested {
        None => config.search_default_limit.clamp(1, max),
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(max, |n| n.min(max)),
    }
}
