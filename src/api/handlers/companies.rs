/// Company listing and insights handlers
use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::CompaniesResponse;
use crate::api::types::CompanyInsightsResponse;
use crate::api::types::CompanyQuery;
use crate::errors::AppError;
use crate::errors::Result;
use crate::rag::company_insights;

/// Known target companies (GET /api/companies-data/total-companies)
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<CompaniesResponse>> {
    let companies = state.store.distinct_companies().await?;
    info!("GET /api/companies-data/total-companies: {} companies", companies.len());
    Ok(Json(CompaniesResponse { companies }))
}

/// Insights for one company (GET /api/companies-data/single-company-data?company=X)
pub async fn single_company_data(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<CompanyInsightsResponse>> {
    let company = query
        .company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Company name is required for this API call.".to_string())
        })?;
    info!("GET /api/companies-data/single-company-data: {}", company);

    let insights = company_insights(state.store.as_ref(), &company).await?;
    Ok(Json(CompanyInsightsResponse {
        company_name: company,
        insights,
    }))
}
