use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::warn;

use crate::api::types::ErrorResponse;
use crate::errors::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.is_user_facing() {
            warn!("Request rejected ({}): {}", status, self);
            ErrorResponse {
                error: self.to_string(),
                details: None,
            }
        } else {
            error!("Request failed: {}", self);
            ErrorResponse {
                error: "Internal server error".to_string(),
                details: self.is_retryable().then(|| "Please try again later.".to_string()),
            }
        };

        (status, Json(body)).into_response()
    }
}
