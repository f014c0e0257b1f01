use crate::agent::ConversationState;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub message_count: usize,
    pub updated_at: String,
}

impl From<&ConversationState> for ThreadSummary {
    fn from(state: &ConversationState) -> Self {
        Self {
            thread_id: state.thread_id().to_string(),
            message_count: state.len(),
            updated_at: state.updated_at().to_rfc3339(),
        }
    }
}

/// Long-term home of conversation threads. The agent reads a thread before
/// a turn and writes it back only after the turn succeeded.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>>;

    async fn save(&self, state: &ConversationState) -> Result<()>;

    async fn list(&self) -> Result<Vec<ThreadSummary>>;

    async fn delete(&self, thread_id: &str) -> Result<bool>;
}
