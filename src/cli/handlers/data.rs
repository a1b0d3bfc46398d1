//! Resume ingestion, search and company handlers

use std::path::Path;
use std::sync::Arc;

use crate::cli::output::print_companies;
use crate::cli::output::print_info;
use crate::cli::output::print_insights;
use crate::cli::output::print_search_results;
use crate::cli::output::print_success;
use crate::embeddings::EmbeddingService;
use crate::models::ResumeRecord;
use crate::rag::company_insights;
use crate::rag::Retriever;
use crate::resume::IngestService;
use crate::vector_store::open_store;
use crate::AppConfig;
use crate::Result;

/// Read a resume JSON file and store it
pub async fn handle_ingest_command(
    config: &AppConfig,
    file: &Path,
    target_company: &str,
    user_id: &str,
) -> Result<()> {
    let content = tokio::fs::read_to_string(file).await?;
    let resume: ResumeRecord = serde_json::from_str(&content)?;

    print_info(&format!("📄 Ingesting {}...", file.display()));
    let store = open_store(config).await?;
    let embedding_service = Arc::new(EmbeddingService::from_app_config(config)?);
    let ingest = IngestService::new(embedding_service, store);

    let outcome = ingest.ingest(&resume, target_company, user_id).await?;
    print_success(&format!(
        "Stored resume {} ({} dimensions)",
        outcome.resume_id, outcome.vector_dimension
    ));
    println!(
        "   {} skills | {:.1} yrs | {}",
        outcome.features.skills.len(),
        outcome.features.experience_years,
        outcome.features.education_level
    );
    Ok(())
}

pub async fn handle_search_command(
    config: &AppConfig,
    query: &str,
    company: Option<&str>,
    limit: usize,
) -> Result<()> {
    print_info(&format!("🔍 Searching: \"{query}\""));
    let store = open_store(config).await?;
    let embedding_service = Arc::new(EmbeddingService::from_app_config(config)?);
    let retriever = Retriever::new(store, embedding_service);

    let company = company.map(str::trim).filter(|c| !c.is_empty());
    let results = retriever
        .search_by_query(query, company, limit.max(1))
        .await?;
    print_search_results(&results);
    Ok(())
}

pub async fn handle_companies_command(config: &AppConfig) -> Result<()> {
    let store = open_store(config).await?;
    let companies = store.distinct_companies().await?;
    print_companies(&companies);
    Ok(())
}

pub async fn handle_insights_command(config: &AppConfig, company: &str, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let insights = company_insights(store.as_ref(), company.trim()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else {
        print_insights(&insights);
    }
    Ok(())
}
