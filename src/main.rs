use std::path::Path;

use anyhow::Context;
use clap::Parser;
use getthatjob::cli::*;
use getthatjob::config::AppConfig;
use tracing::info;

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => AppConfig::load().context("failed to load configuration"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    // Initialize logging
    if cli.verbose {
        getthatjob::logging::init_logging_with_level("debug")?;
    } else {
        getthatjob::logging::init_logging_with_config(&config)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            handle_serve_api(&config, host, port, cors).await?;
        }
        Commands::Init => {
            handle_init_command(&config).await?;
        }
        Commands::Ingest {
            file,
            target_company,
            user_id,
        } => {
            handle_ingest_command(&config, &file, &target_company, &user_id)
                .await
                .with_context(|| format!("failed to ingest {}", file.display()))?;
        }
        Commands::Search {
            query,
            company,
            limit,
        } => {
            handle_search_command(&config, &query, company.as_deref(), limit).await?;
        }
        Commands::Ask { query, interactive } => {
            handle_ask_command(&config, query, interactive).await?;
        }
        Commands::Companies => {
            handle_companies_command(&config).await?;
        }
        Commands::Insights { company, json } => {
            handle_insights_command(&config, &company, json).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
