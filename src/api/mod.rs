//! HTTP API for resume ingestion, search, chat and company insights

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use server::app;
pub use server::build_state;
pub use server::serve_api;
