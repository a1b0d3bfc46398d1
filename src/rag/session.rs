//! Conversation history storage

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::llm::ChatTurn;

/// Model-facing chat histories keyed by session id.
///
/// Concurrent turns on the same session are last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<Vec<ChatTurn>>;

    async fn set(&self, session_id: &str, history: Vec<ChatTurn>);

    /// Returns whether a session was removed
    async fn clear(&self, session_id: &str) -> bool;

    async fn len(&self) -> usize;

    /// Fresh id of the form `session_<millis>_<9 chars>`
    fn generate_id(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("session_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
    }
}

/// Process-local store bounded by `capacity`.
///
/// When a write pushes the count over capacity, the session that was
/// created first is evicted. Updating a session does not refresh its
/// position.
pub struct InMemorySessionStore {
    sessions: DashMap<String, Vec<ChatTurn>>,
    order: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn order(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<Vec<ChatTurn>> {
        self.sessions.get(session_id).map(|h| h.value().clone())
    }

    async fn set(&self, session_id: &str, history: Vec<ChatTurn>) {
        let mut order = self.order();
        if self
            .sessions
            .insert(session_id.to_string(), history)
            .is_none()
        {
            order.push_back(session_id.to_string());
        }

        if self.sessions.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.sessions.remove(&oldest);
                debug!("Evicted session {} (capacity {})", oldest, self.capacity);
            }
        }
    }

    async fn clear(&self, session_id: &str) -> bool {
        let mut order = self.order();
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            order.retain(|id| id != session_id);
        }
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.len()
    }
}
