use crate::agent::ConversationState;
use crate::error::Result;
use crate::traits::{ThreadStore, ThreadSummary};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps threads for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryThreadStore {
    threads: RwLock<HashMap<String, ConversationState>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, state: &ConversationState) -> Result<()> {
        self.threads
            .write()
            .await
            .insert(state.thread_id().to_string(), state.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ThreadSummary>> {
        let threads = self.threads.read().await;
        let mut summaries: Vec<_> = threads.values().map(ThreadSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        Ok(self.threads.write().await.remove(thread_id).is_some())
    }
}
