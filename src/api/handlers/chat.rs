/// Chat handler
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::types::ClearSessionResponse;
use crate::errors::AppError;
use crate::errors::Result;
use crate::rag::ChatTurnRequest;

const CLEAR_SESSION_ACTION: &str = "clearSession";

/// One chat turn, or a session reset when `action` is `clearSession` (POST /api/chat)
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Result<Response> {
    if req.action.as_deref() == Some(CLEAR_SESSION_ACTION) {
        let session_id = req
            .session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation("Session ID is required to clear a session".to_string())
            })?;
        state.rag_service.clear_session(&session_id).await;
        return Ok(Json(ClearSessionResponse {
            success: true,
            session_id,
        })
        .into_response());
    }

    let query = req
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing query".to_string()))?;
    info!("POST /api/chat (session {:?})", req.session_id);

    let response = state
        .rag_service
        .chat_turn(ChatTurnRequest {
            query,
            client_history: req.chat_history,
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ChatResponse {
        degraded: response.answer.is_degraded(),
        answer: response.answer.text().to_string(),
        target_company: response.target_company,
        updated_chat_history: response.updated_chat_history,
        session_id: response.session_id,
    })
    .into_response())
}
