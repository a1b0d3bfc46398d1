/// Resume ingestion and management handlers
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::auth::Identity;
use crate::api::types::DeleteResumeResponse;
use crate::api::types::ResumeListResponse;
use crate::api::types::ResumeView;
use crate::api::types::UpdateResumeRequest;
use crate::api::types::UpdateResumeResponse;
use crate::api::types::VectorizeRequest;
use crate::api::types::VectorizeResponse;
use crate::errors::AppError;
use crate::errors::Result;
use crate::models::ResumeVector;

/// Vectorize and store a resume (POST /api/vectorize)
pub async fn vectorize_resume(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<VectorizeRequest>,
) -> Result<Json<VectorizeResponse>> {
    let resume = req
        .resume_data
        .ok_or_else(|| AppError::Validation("Resume data is required".to_string()))?;
    let user_id = identity.or_dev_user(req.user_id.as_deref(), &state.auth)?;
    let target_company = req.target_company.unwrap_or_default();
    info!("POST /api/vectorize for user {}", user_id);

    let outcome = state
        .ingest_service
        .ingest(&resume, &target_company, &user_id)
        .await?;

    Ok(Json(VectorizeResponse {
        success: true,
        resume_id: outcome.resume_id,
        vector_dimension: outcome.vector_dimension,
        features: outcome.features,
        message: "Resume vectorized and stored successfully".to_string(),
    }))
}

/// List the caller's resumes (GET /api/vectorize)
pub async fn list_my_resumes(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ResumeListResponse>> {
    let user_id = identity.require()?;
    info!("GET /api/vectorize for user {}", user_id);

    let resumes: Vec<ResumeView> = state
        .store
        .list_by_user(&user_id)
        .await?
        .into_iter()
        .map(ResumeView::from)
        .collect();

    Ok(Json(ResumeListResponse {
        success: true,
        count: resumes.len(),
        resumes,
    }))
}

/// Change the target company of a resume (PUT /api/update-resume)
pub async fn update_resume(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<UpdateResumeResponse>> {
    let user_id = identity.require()?;
    let (resume_id, target_company) = match (req.resume_id, req.target_company) {
        (Some(id), Some(company)) if !id.trim().is_empty() && !company.trim().is_empty() => {
            (id, company.trim().to_string())
        }
        _ => {
            return Err(AppError::Validation(
                "Resume ID and target company are required".to_string(),
            ))
        }
    };
    info!("PUT /api/update-resume {} -> {}", resume_id, target_company);

    owned_resume(&state, &resume_id, &user_id).await?;
    let updated = state
        .store
        .update_target_company(&resume_id, &target_company)
        .await?;

    Ok(Json(UpdateResumeResponse {
        success: true,
        message: "Target company updated successfully".to_string(),
        resume_id: updated.id,
        target_company: updated.target_company,
    }))
}

/// Delete one of the caller's resumes (DELETE /api/resumes/:id)
pub async fn delete_resume(
    State(state): State<AppState>,
    identity: Identity,
    Path(resume_id): Path<String>,
) -> Result<Json<DeleteResumeResponse>> {
    let user_id = identity.require()?;
    info!("DELETE /api/resumes/{}", resume_id);

    owned_resume(&state, &resume_id, &user_id).await?;
    if !state.store.delete(&resume_id).await? {
        return Err(AppError::NotFound(format!("resume {resume_id}")));
    }

    Ok(Json(DeleteResumeResponse {
        success: true,
        resume_id,
    }))
}

/// Records owned by someone else are reported as missing
async fn owned_resume(state: &AppState, resume_id: &str, user_id: &str) -> Result<ResumeVector> {
    match state.store.get(resume_id).await? {
        Some(record) if record.user_id == user_id => Ok(record),
        _ => Err(AppError::NotFound(format!("resume {resume_id}"))),
    }
}
