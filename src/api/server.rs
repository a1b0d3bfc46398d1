//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingService;
use crate::llm::ChatModel;
use crate::llm::GeminiClient;
use crate::rag::InMemorySessionStore;
use crate::rag::LlmCompanyResolver;
use crate::vector_store::open_store;
use crate::Result;

/// Resume payloads are small; anything larger is rejected before parsing
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build the shared state from configuration
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let store = open_store(config).await?;
    let embedding_service = Arc::new(EmbeddingService::from_app_config(config)?);
    let chat_model: Arc<dyn ChatModel> = Arc::new(GeminiClient::new(&config.llm)?);
    let resolver = Arc::new(LlmCompanyResolver::new(chat_model.clone()));
    let sessions = Arc::new(InMemorySessionStore::new(config.rag.max_sessions));

    Ok(AppState::new(
        config,
        store,
        embedding_service,
        chat_model,
        resolver,
        sessions,
    ))
}

/// Router with `/api` routes and middleware layers
pub fn app(state: AppState, enable_cors: bool) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(middleware);

    // Add CORS if enabled
    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting GetThatJob API server...");

    let state = build_state(config).await?;
    state.store.ensure_collection().await?;
    let app = app(state, enable_cors);

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET    /api/health                              - Health check");
    info!("  POST   /api/vectorize                           - Vectorize a resume");
    info!("  GET    /api/vectorize                           - List my resumes");
    info!("  PUT    /api/update-resume                       - Change target company");
    info!("  DELETE /api/resumes/:id                         - Delete a resume");
    info!("  POST   /api/search-resumes                      - Similarity search");
    info!("  POST   /api/chat                                - Career chat turn");
    info!("  GET    /api/companies-data/total-companies      - Known companies");
    info!("  GET    /api/companies-data/single-company-data  - Company insights");

    axum::serve(listener, app).await?;

    Ok(())
}
