//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - init: Collection bootstrap
//! - data: Ingestion, search and company queries
//! - rag: Career assistant chat
//! - serve: API server
//! - info: Configuration display

pub mod data;
pub mod info;
pub mod init;
pub mod rag;
pub mod serve;

// Re-export all public handlers
pub use data::*;
pub use info::*;
pub use init::*;
pub use rag::*;
pub use serve::*;
