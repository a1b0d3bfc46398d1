//! Logging configuration for GetThatJob

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "getthatjob.log";

/// Initialize logging with configuration
pub fn init_logging_with_config(config: &crate::config::AppConfig) -> Result<()> {
    init_logging_with_level(&config.logging.level)
}

/// Initialize logging with a custom log level.
///
/// Logs go to stderr and to a daily rolling file under `logs/`. `RUST_LOG`
/// takes precedence over `level` when set.
pub fn init_logging_with_level(level: &str) -> Result<()> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},getthatjob={level}")));

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::AppError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!("Logging initialized with level: {}", level);
    tracing::info!("Log files will be saved to: {}/{}.YYYY-MM-DD", LOG_DIR, LOG_FILE_PREFIX);

    // The writer guard must outlive the process
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple console logging for tests
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .map_err(|e| crate::AppError::Config(format!("logging already initialized: {e}")))?;

    tracing::debug!("Simple logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_logging_is_reentrant() {
        // A second initialization reports an error instead of panicking
        let _ = init_simple_logging();
        assert!(init_simple_logging().is_err());
    }
}
