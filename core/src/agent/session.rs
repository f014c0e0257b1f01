use crate::agent::{AgentLoop, ConversationState};
use crate::error::Result;
use crate::traits::{Message, ThreadStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub thread_id: String,
    pub answer: Message,
    /// Messages this turn added to the thread, the human input included.
    pub new_messages: usize,
    pub total_messages: usize,
}

/// Runs turns against persisted threads: load before the turn, save after
/// it. A failed turn leaves the stored thread untouched.
pub struct Session {
    agent: Arc<AgentLoop>,
    store: Arc<dyn ThreadStore>,
}

impl Session {
    pub fn new(agent: Arc<AgentLoop>, store: Arc<dyn ThreadStore>) -> Self {
        Self { agent, store }
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Continues `thread_id`, or starts a new thread when it is `None` or
    /// not found.
    pub async fn run(
        &self,
        thread_id: Option<&str>,
        input: Message,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let mut state = match thread_id {
            Some(id) => match self.store.load(id).await? {
                Some(state) => state,
                None => {
                    info!(thread_id = id, "starting new thread");
                    ConversationState::new(id)
                }
            },
            None => ConversationState::new_thread(),
        };

        let before = state.len();
        let answer = self.agent.run_turn(&mut state, input, cancel).await?;
        self.store.save(&state).await?;

        Ok(TurnOutcome {
            thread_id: state.thread_id().to_string(),
            answer,
            new_messages: state.len() - before,
            total_messages: state.len(),
        })
    }
}
