use crate::agent::ConversationState;
use crate::error::{AgentError, Result};
use crate::traits::{ThreadStore, ThreadSummary};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One pretty-printed JSON file per thread under `<data_dir>/threads/`.
pub struct JsonFileThreadStore {
    dir: PathBuf,
}

impl JsonFileThreadStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("threads"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, thread_id: &str) -> Result<PathBuf> {
        if is_unsafe_thread_id(thread_id) {
            return Err(AgentError::Store(format!(
                "invalid thread id: {:?}",
                thread_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", thread_id)))
    }
}

fn is_unsafe_thread_id(id: &str) -> bool {
    id.trim().is_empty()
        || id.contains("..")
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0')
}

fn store_err(context: &str, path: &Path, e: impl std::fmt::Display) -> AgentError {
    AgentError::Store(format!("{} {}: {}", context, path.display(), e))
}

#[async_trait]
impl ThreadStore for JsonFileThreadStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, thread_id: &str) -> Result<Option<ConversationState>> {
        let path = self.path_for(thread_id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err("failed to read", &path, e)),
        };
        let state =
            serde_json::from_str(&raw).map_err(|e| store_err("failed to parse", &path, e))?;
        Ok(Some(state))
    }

    async fn save(&self, state: &ConversationState) -> Result<()> {
        let path = self.path_for(state.thread_id())?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| store_err("failed to create", &self.dir, e))?;

        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| store_err("failed to serialize", &path, e))?;

        // write-then-rename
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| store_err("failed to write", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| store_err("failed to write", &path, e))?;

        tracing::debug!(thread_id = state.thread_id(), path = %path.display(), "thread saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ThreadSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(store_err("failed to read", &self.dir, e)),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_err("failed to read", &self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(thread_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(thread_id).await {
                Ok(Some(state)) => summaries.push(ThreadSummary::from(&state)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable thread file: {}", e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        let path = self.path_for(thread_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(store_err("failed to delete", &path, e)),
        }
    }
}
