//! CLI output formatting utilities

use crate::models::ScoredResume;
use crate::rag::CompanyInsights;
use crate::rag::CountedItem;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print search hits, best first
pub fn print_search_results(results: &[ScoredResume]) {
    if results.is_empty() {
        print_warning("No matching resumes found");
        return;
    }

    println!("Found {} resumes:", results.len());
    println!();
    for (i, hit) in results.iter().enumerate() {
        let record = &hit.record;
        println!(
            "  {}. [{:.3}] {} | user: {} | target: {}",
            i + 1,
            hit.score,
            record.id,
            record.user_id,
            if record.target_company.is_empty() {
                "-"
            } else {
                &record.target_company
            }
        );
        println!(
            "     {:.1} yrs | {} | skills: {}",
            record.experience_years,
            record.education_level,
            truncate_str(&record.skills.join(", "), 80)
        );
        let first_line = record.resume_text.lines().next().unwrap_or_default();
        println!("     {}", truncate_str(first_line, 100));
    }
}

/// Print the company list
pub fn print_companies(companies: &[String]) {
    if companies.is_empty() {
        print_warning("No target companies stored yet");
        return;
    }
    println!("🏢 {} target companies:", companies.len());
    for company in companies {
        println!("  - {company}");
    }
}

fn print_counted(title: &str, items: &[CountedItem]) {
    if items.is_empty() {
        return;
    }
    println!("{title}");
    for item in items {
        println!("  {:<32} {}", truncate_str(&item.name, 30), item.count);
    }
    println!();
}

/// Print company insights
pub fn print_insights(insights: &CompanyInsights) {
    println!("📊 Insights for {}", insights.company);
    println!();
    if insights.resume_count == 0 {
        print_warning("No resumes target this company");
        return;
    }

    println!("  Resumes: {}", insights.resume_count);
    println!(
        "  Experience: {:.1} yrs average, {:.1} yrs max",
        insights.average_experience_years, insights.max_experience_years
    );
    println!();

    print_counted("🎓 Education:", &insights.education_distribution);
    print_counted("🛠️  Top skills:", &insights.top_skills);
    print_counted("💼 Top job titles:", &insights.top_job_titles);
    print_counted("🏢 Previous companies:", &insights.top_previous_companies);
    print_counted("⚙️  Tech stack:", &insights.tech_stack);
    print_counted("🧭 Themes:", &insights.themes);
}

/// Print configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    let config = config.masked();
    println!("📋 GetThatJob Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", config.database_url());
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Key: {}", display_secret(&config.embeddings.api_key));
    println!();

    println!("📦 Vector store:");
    println!("  Backend: {:?}", config.vector_store.backend);
    println!("  Collection: {}", config.vector_store.collection);
    println!("  HNSW ef_search: {}", config.vector_store.ef_search);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm.endpoint);
    println!("  Model: {}", config.llm_model());
    println!("  Max output tokens: {}", config.llm.max_output_tokens);
    println!("  Key: {}", display_secret(&config.llm.api_key));
    println!();

    println!("💬 RAG:");
    println!("  Max context window: {} chars", config.max_context_window());
    println!("  Retrieval limit: {}", config.rag.retrieval_limit);
    println!("  Max sessions: {}", config.rag.max_sessions);
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!("  JWT secret: {}", display_secret(&config.auth.jwt_secret));
    println!("  Dev mode: {}", config.auth.dev_mode_enabled);
}

fn display_secret(masked: &str) -> &str {
    if masked.is_empty() {
        "(not set)"
    } else {
        masked
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}
