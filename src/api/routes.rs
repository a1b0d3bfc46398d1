//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Resume endpoints
        .route(
            "/vectorize",
            post(handlers::vectorize_resume).get(handlers::list_my_resumes),
        )
        .route("/update-resume", put(handlers::update_resume))
        .route("/resumes/:id", delete(handlers::delete_resume))
        // Search
        .route("/search-resumes", post(handlers::search_resumes))
        // Chat
        .route("/chat", post(handlers::chat))
        // Companies
        .route(
            "/companies-data/total-companies",
            get(handlers::list_companies),
        )
        .route(
            "/companies-data/single-company-data",
            get(handlers::single_company_data),
        )
        .with_state(state)
}
