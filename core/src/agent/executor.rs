use crate::agent::ToolRegistry;
use crate::traits::{ToolCall, ToolCallResult};
use futures_util::future::join_all;
use tracing::{debug, warn};

/// Runs tool calls against a registry. Every failure, including an unknown
/// tool or bad arguments, comes back as a failed `ToolCallResult`.
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutor {
    parallel: bool,
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub async fn execute(&self, request: &ToolCall, registry: &ToolRegistry) -> ToolCallResult {
        let tool = match registry.lookup(&request.name) {
            Ok(tool) => tool,
            Err(e) => {
                warn!(tool = %request.name, call_id = %request.id, "unknown tool requested");
                return ToolCallResult::failure(&request.id, &request.name, e);
            }
        };

        if let Err(e) = tool.spec().validate(&request.arguments) {
            warn!(tool = %request.name, call_id = %request.id, error = %e, "rejected tool arguments");
            return ToolCallResult::failure(&request.id, &request.name, e);
        }

        match tool.call(&request.arguments).await {
            Ok(value) => {
                debug!(tool = %request.name, call_id = %request.id, "tool succeeded");
                ToolCallResult::success(&request.id, &request.name, value)
            }
            Err(e) => {
                warn!(tool = %request.name, call_id = %request.id, error = %e, "tool failed");
                ToolCallResult::failure(&request.id, &request.name, e)
            }
        }
    }

    /// Executes a batch. Results are in request order whatever the
    /// completion order was.
    pub async fn execute_all(
        &self,
        requests: &[ToolCall],
        registry: &ToolRegistry,
    ) -> Vec<ToolCallResult> {
        if self.parallel {
            join_all(requests.iter().map(|r| self.execute(r, registry))).await
        } else {
            let mut results = Vec::with_capacity(requests.len());
            for request in requests {
                results.push(self.execute(request, registry).await);
            }
            results
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::testing::DelayedTool;
    use crate::tools::register_arithmetic;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_arithmetic(&mut registry).unwrap();
        registry
    }

    #[tokio::test]
    async fn executes_known_tool() {
        let result = ToolExecutor::new()
            .execute(&ToolCall::new("c1", "add", json!({"a": 2, "b": 3})), &registry())
            .await;
        assert_eq!(result.call_id, "c1");
        assert_eq!(result.outcome, Ok(json!(5)));
    }

    #[tokio::test]
    async fn same_request_gives_same_result() {
        let registry = registry();
        let executor = ToolExecutor::new();
        let request = ToolCall::new("c1", "add", json!({"a": 20, "b": 22}));
        let first = executor.execute(&request, &registry).await;
        let second = executor.execute(&request, &registry).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_failed_result() {
        let result = ToolExecutor::new()
            .execute(&ToolCall::new("c1", "sqrt", json!({"x": 4})), &registry())
            .await;
        assert_eq!(result.outcome, Err(ToolError::UnknownTool("sqrt".into())));
        assert_eq!(result.content(), "tool not found: sqrt");
    }

    #[tokio::test]
    async fn bad_arguments_become_failed_result() {
        let result = ToolExecutor::new()
            .execute(&ToolCall::new("c1", "add", json!({"a": "two", "b": 3})), &registry())
            .await;
        assert!(matches!(
            result.outcome,
            Err(ToolError::ArgumentValidation { .. })
        ));
    }

    #[tokio::test]
    async fn division_by_zero_is_captured() {
        let result = ToolExecutor::new()
            .execute(&ToolCall::new("c1", "divide", json!({"a": 5, "b": 0})), &registry())
            .await;
        assert_eq!(result.content(), "division by zero");
    }

    #[tokio::test]
    async fn batch_keeps_request_order() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ToolRegistry::new();
        registry
            .register(DelayedTool::new("slow", 60, json!("slow done")).with_log(finished.clone()))
            .unwrap();
        registry
            .register(DelayedTool::new("fast", 0, json!("fast done")).with_log(finished.clone()))
            .unwrap();

        let requests = vec![
            ToolCall::new("c1", "slow", json!({})),
            ToolCall::new("c2", "fast", json!({})),
        ];
        let results = ToolExecutor::new().execute_all(&requests, &registry).await;
        let ids: Vec<_> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(*finished.lock().unwrap(), vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_block_others() {
        let requests = vec![
            ToolCall::new("c1", "divide", json!({"a": 1, "b": 0})),
            ToolCall::new("c2", "multiply", json!({"a": 2, "b": 3})),
        ];
        let results = ToolExecutor::new()
            .with_parallel(false)
            .execute_all(&requests, &registry())
            .await;
        assert!(!results[0].is_success());
        assert_eq!(results[1].outcome, Ok(json!(6)));
    }

    #[tokio::test]
    async fn sequential_mode_runs_in_order() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ToolRegistry::new();
        registry
            .register(DelayedTool::new("first", 30, json!(1)).with_log(finished.clone()))
            .unwrap();
        registry
            .register(DelayedTool::new("second", 0, json!(2)).with_log(finished.clone()))
            .unwrap();

        let requests = vec![
            ToolCall::new("c1", "first", json!({})),
            ToolCall::new("c2", "second", json!({})),
        ];
        let results = ToolExecutor::new()
            .with_parallel(false)
            .execute_all(&requests, &registry)
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(*finished.lock().unwrap(), vec!["first", "second"]);
    }
}
