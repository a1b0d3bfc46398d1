//! Collection initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::vector_store::open_store;
use crate::AppConfig;
use crate::Result;

/// Create the resume collection and its indexes if they do not exist
pub async fn handle_init_command(config: &AppConfig) -> Result<()> {
    print_info(&format!(
        "🗄️  Initializing collection '{}' ({:?} backend, dimension {})...",
        config.vector_store.collection,
        config.vector_store.backend,
        config.embedding_dimension()
    ));

    let store = open_store(config).await?;
    store.ensure_collection().await?;

    print_success("Collection and indexes ready");
    Ok(())
}
