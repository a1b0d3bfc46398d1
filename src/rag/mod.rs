//! RAG (Retrieval-Augmented Generation) module
//!
//! Conversational retrieval over stored resumes:
//! - Query embedding and target company resolution
//! - Similarity search filtered by target company
//! - Context assembly and context window gating
//! - Chat generation with per-session history
//!
//! # Examples
//!
//! ```rust,no_run
//! use getthatjob::rag::ChatTurnRequest;
//! use getthatjob::rag::RagService;
//!
//! async fn ask(service: &RagService) -> getthatjob::Result<()> {
//!     let response = service
//!         .chat_turn(ChatTurnRequest {
//!             query: "Who has Kubernetes experience for Acme Corp?".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Answer: {}", response.answer.text());
//!     println!("Session: {}", response.session_id);
//!     Ok(())
//! }
//! ```

pub mod company;
pub mod context;
pub mod insights;
pub mod pipeline;
pub mod retriever;
pub mod session;

pub use company::CompanyResolver;
pub use company::KeywordCompanyResolver;
pub use company::LlmCompanyResolver;
pub use context::ContextAssembler;
pub use insights::company_insights;
pub use insights::CompanyInsights;
pub use insights::CountedItem;
pub use pipeline::ChatTurnRequest;
pub use pipeline::ChatTurnResponse;
pub use pipeline::ClientMessage;
pub use pipeline::RagService;
pub use pipeline::TurnAnswer;
pub use retriever::Retriever;
pub use session::InMemorySessionStore;
pub use session::SessionStore;
