//! One chat turn: Embed + Resolve company -> Retrieve -> Gate -> Generate

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::RagConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::AppError;
use crate::errors::Result;
use crate::llm::prompts::APOLOGY;
use crate::llm::prompts::GREETING;
use crate::llm::ChatModel;
use crate::llm::ChatPart;
use crate::llm::ChatRole;
use crate::llm::ChatTurn;
use crate::llm::ResumePrompts;
use crate::models::ScoredResume;
use crate::rag::CompanyResolver;
use crate::rag::ContextAssembler;
use crate::rag::SessionStore;
use crate::vector_store::VectorStore;

/// Message as displayed by the client, with a stable id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub id: String,
    pub role: ChatRole,
    #[serde(default)]
    pub parts: Vec<ChatPart>,
}

impl ClientMessage {
    fn new(id: impl Into<String>, role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            parts: vec![ChatPart { text: text.into() }],
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Input to one turn
#[derive(Debug, Clone, Default)]
pub struct ChatTurnRequest {
    pub query: String,
    /// Display history held by the client; never sent to the model
    pub client_history: Vec<ClientMessage>,
    pub session_id: Option<String>,
}

/// The model's answer, or the apology that replaced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAnswer {
    Generated(String),
    Degraded { answer: String, reason: String },
}

impl TurnAnswer {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(answer) | Self::Degraded { answer, .. } => answer,
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ChatTurnResponse {
    pub answer: TurnAnswer,
    pub target_company: Option<String>,
    pub updated_chat_history: Vec<ClientMessage>,
    pub session_id: String,
    pub results: Vec<ScoredResume>,
}

/// Conversational retrieval over stored resumes
pub struct RagService {
    embeddings: Arc<EmbeddingService>,
    store: Arc<dyn VectorStore>,
    resolver: Arc<dyn CompanyResolver>,
    chat_model: Arc<dyn ChatModel>,
    sessions: Arc<dyn SessionStore>,
    context_assembler: ContextAssembler,
    max_context_window: usize,
    retrieval_limit: usize,
}

impl RagService {
    pub fn new(
        embeddings: Arc<EmbeddingService>,
        store: Arc<dyn VectorStore>,
        resolver: Arc<dyn CompanyResolver>,
        chat_model: Arc<dyn ChatModel>,
        sessions: Arc<dyn SessionStore>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            resolver,
            chat_model,
            sessions,
            context_assembler: ContextAssembler::new(),
            max_context_window: config.max_context_window,
            retrieval_limit: config.retrieval_limit,
        }
    }

    /// Run one conversational turn.
    ///
    /// # Errors
    /// - `Validation` for an empty query
    /// - `Embedding` / store errors from retrieval
    /// - `ContextWindowExceeded` when the composed message is over the limit;
    ///   the model is not called and the session is left untouched
    ///
    /// A failing model call does not error: the answer comes back as
    /// [`TurnAnswer::Degraded`].
    pub async fn chat_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Missing query".to_string()));
        }
        info!("Processing chat turn: {}", query);

        // Step 1: embed the question while resolving the company
        let (query_vector, target_company) =
            tokio::join!(self.embeddings.embed_query(query), self.resolve_company(query));
        let query_vector = query_vector?;
        debug!("Target company: {:?}", target_company);

        // Step 2: retrieve and assemble context
        let results = self
            .store
            .search(&query_vector, target_company.as_deref(), self.retrieval_limit)
            .await?;
        let context = self.context_assembler.assemble(&results);
        debug!("Retrieved {} resumes, context {} chars", results.len(), context.len());

        // Step 3: gate on the composed message before touching the session
        let message = ResumePrompts::compose_turn(&context, target_company.as_deref(), query);
        let length = message.chars().count();
        if length > self.max_context_window {
            warn!(
                "Chat context window limit exceeded: {} > {}",
                length, self.max_context_window
            );
            return Err(AppError::ContextWindowExceeded {
                length,
                limit: self.max_context_window,
            });
        }

        // Step 4: load or seed the model-facing history
        let session_id = request
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.sessions.generate_id());
        let history = match self.sessions.get(&session_id).await {
            Some(history) if !history.is_empty() => history,
            _ => {
                debug!("Starting session {}", session_id);
                seed_history()
            }
        };

        // Step 5: generate
        let answer = match self.chat_model.send_message(&history, &message).await {
            Ok(reply) => {
                self.sessions.set(&session_id, reply.history).await;
                TurnAnswer::Generated(reply.text)
            }
            Err(e) => {
                error!("Chat model failed for session {}: {}", session_id, e);
                TurnAnswer::Degraded {
                    answer: APOLOGY.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let updated_chat_history =
            build_client_history(&request.client_history, query, answer.text());

        info!(
            "Chat turn complete for session {} ({} results, degraded: {})",
            session_id,
            results.len(),
            answer.is_degraded()
        );

        Ok(ChatTurnResponse {
            answer,
            target_company,
            updated_chat_history,
            session_id,
            results,
        })
    }

    /// Drop a session's history. Returns whether it existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.clear(session_id).await;
        info!("Cleared session {} (existed: {})", session_id, removed);
        removed
    }

    /// Best effort: any failure means no company filter
    async fn resolve_company(&self, query: &str) -> Option<String> {
        let known = match self.store.distinct_companies().await {
            Ok(known) => known,
            Err(e) => {
                warn!("Could not list companies for resolution: {}", e);
                return None;
            }
        };
        match self.resolver.resolve(query, &known).await {
            Ok(company) => company,
            Err(e) => {
                warn!("Company resolution failed: {}", e);
                None
            }
        }
    }
}

/// Fixed instructions followed by the greeting
fn seed_history() -> Vec<ChatTurn> {
    vec![
        ChatTurn::user(ResumePrompts::career_assistant()),
        ChatTurn::model(GREETING),
    ]
}

/// Display history: greeting on the first turn, the client's messages with
/// stable ids, then the literal query and the answer.
fn build_client_history(
    client_history: &[ClientMessage],
    query: &str,
    answer: &str,
) -> Vec<ClientMessage> {
    let now = Utc::now().timestamp_millis();
    let mut history = Vec::with_capacity(client_history.len() + 3);

    if client_history.is_empty() {
        history.push(ClientMessage::new("initial-greeting", ChatRole::Model, GREETING));
    }

    for (index, msg) in client_history.iter().enumerate() {
        let snippet = msg
            .parts
            .first()
            .map_or_else(|| now.to_string(), |part| id_snippet(&part.text));
        let role = match msg.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
            ChatRole::System => "system",
        };
        history.push(ClientMessage {
            id: format!("hist-{role}-{index}-{snippet}"),
            role: msg.role,
            parts: msg.parts.clone(),
        });
    }

    history.push(ClientMessage::new(format!("user-{now}"), ChatRole::User, query));
    history.push(ClientMessage::new(
        format!("model-{}", now + 1),
        ChatRole::Model,
        answer,
    ));
    history
}

/// First 15 characters, whitespace as `_`, other non-alphanumerics dropped
fn id_snippet(text: &str) -> String {
    text.chars()
        .take(15)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_gets_greeting() {
        let history = build_client_history(&[], "Who knows Rust?", "Ada does.");

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].id, "initial-greeting");
        assert_eq!(history[0].text(), GREETING);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[1].text(), "Who knows Rust?");
        assert!(history[1].id.starts_with("user-"));
        assert_eq!(history[2].text(), "Ada does.");
        assert!(history[2].id.starts_with("model-"));
    }

    #[test]
    fn test_model_id_follows_user_id() {
        let history = build_client_history(&[], "q", "a");
        let user: i64 = history[1].id.trim_start_matches("user-").parse().unwrap();
        let model: i64 = history[2].id.trim_start_matches("model-").parse().unwrap();
        assert_eq!(model, user + 1);
    }

    #[test]
    fn test_existing_history_gets_stable_ids() {
        let prior = vec![
            ClientMessage::new("", ChatRole::Model, GREETING),
            ClientMessage::new("x", ChatRole::User, "Hi there, what's up?"),
        ];
        let history = build_client_history(&prior, "next", "answer");

        assert_eq!(history.len(), 4);
        assert_eq!(history[0].id, "hist-model-0-Hello_Im_here");
        assert_eq!(history[1].id, "hist-user-1-Hi_there_what");
    }

    #[test]
    fn test_id_snippet() {
        assert_eq!(id_snippet("a b\tc!d"), "a_b_cd");
        assert_eq!(id_snippet("0123456789abcdefgh"), "0123456789abcde");
    }

    #[test]
    fn test_seed_history_shape() {
        let seed = seed_history();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].role, ChatRole::User);
        assert_eq!(seed[1], ChatTurn::model(GREETING));
    }

    #[test]
    fn test_turn_answer_accessors() {
        let degraded = TurnAnswer::Degraded {
            answer: APOLOGY.to_string(),
            reason: "boom".to_string(),
        };
        assert!(degraded.is_degraded());
        assert_eq!(degraded.text(), APOLOGY);
        assert!(!TurnAnswer::Generated("ok".to_string()).is_degraded());
    }
}
