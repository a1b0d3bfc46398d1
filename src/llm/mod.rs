//! Chat model abstraction
//!
//! Conversations are a list of [`ChatTurn`]s with `user` and `model` roles,
//! each holding one or more text parts. The model never sees anything but
//! this history plus the next message.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
pub use gemini::GeminiClient;
pub use prompts::PromptTemplate;
pub use prompts::ResumePrompts;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
    /// Only appears in client-side display history
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPart {
    #[serde(default)]
    pub text: String,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    #[serde(default)]
    pub parts: Vec<ChatPart>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ChatPart { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, text)
    }

    /// All parts concatenated
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// A model reply together with the conversation extended by it
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    /// Prior history, then the sent message, then the reply
    pub history: Vec<ChatTurn>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Continue `history` with `message` and return the model's answer
    async fn send_message(&self, history: &[ChatTurn], message: &str) -> Result<ChatReply>;

    /// One-shot completion without history
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.send_message(&[], prompt).await?.text)
    }

    fn model_name(&self) -> &str;
}
