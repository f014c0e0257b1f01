use crate::error::{AgentError, Result, ToolError};
use crate::traits::{Tool, ToolSpec};
use std::sync::Arc;

/// Tools known to an agent. Filled once at startup, then shared read-only.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.contains(tool.name()) {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> std::result::Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Specs in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
