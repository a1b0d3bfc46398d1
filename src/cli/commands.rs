//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "getthatjob")]
#[command(about = "Resume vectorization, company-filtered search and career chat")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS regardless of config
        #[arg(long)]
        cors: bool,
    },
    /// Create the resume collection and its indexes if missing
    Init,
    /// Vectorize and store a resume JSON file
    Ingest {
        /// Path to a resume JSON document
        file: PathBuf,
        /// Company the resume targets
        #[arg(short = 't', long, default_value = "")]
        target_company: String,
        /// Owner of the stored resume
        #[arg(short, long)]
        user_id: String,
    },
    /// Similarity search over stored resumes
    Search {
        /// Free-text query
        query: String,
        /// Only return resumes targeting this company
        #[arg(long)]
        company: Option<String>,
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Ask the career assistant one question
    Ask {
        /// The question
        query: String,
        /// Keep the session open and read follow-up questions from stdin
        #[arg(short, long)]
        interactive: bool,
    },
    /// List known target companies
    Companies,
    /// Show aggregated insights for one company
    Insights {
        /// Company name, matched exactly
        company: String,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration with secrets masked
    Config,
}
