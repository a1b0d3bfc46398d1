use thiserror::Error;

/// Message returned to the client when a chat turn would overflow the model context.
pub const CONTEXT_WINDOW_REMEDIATION: &str =
    "Please clear the chat to start a new conversation.";

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or empty request input
    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    AuthRequired,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(
        "Chat context window limit exceeded ({limit} characters, got {length}). {}",
        CONTEXT_WINDOW_REMEDIATION
    )]
    ContextWindowExceeded { length: usize, limit: usize },

    #[error("Model generation error: {0}")]
    ModelGeneration(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status equivalent for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::ContextWindowExceeded { .. } => 400,
            Self::AuthRequired => 401,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Whether the message may be shown to the client as-is.
    ///
    /// Infrastructure failures are masked behind a generic message.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::AuthRequired
                | Self::NotFound(_)
                | Self::ContextWindowExceeded { .. }
        )
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::StoreUnavailable(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.url().map_or_else(
                || "remote service".to_string(),
                |u| u.host_str().unwrap_or("remote service").to_string(),
            ))
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("resume".to_string()),
            sqlx::Error::PoolTimedOut => Self::Timeout("vector store connection".to_string()),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout("vector store".to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
