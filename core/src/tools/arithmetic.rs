use crate::error::ToolError;
use crate::tools::extract_int_arg;
use crate::traits::{ParamKind, ParamSpec, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::{Value, json};

fn int_pair() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("a", ParamKind::Integer, "first int"),
        ParamSpec::new("b", ParamKind::Integer, "second int"),
    ]
}

fn operands(args: &ToolArgs, tool: &str) -> Result<(i64, i64), ToolError> {
    Ok((
        extract_int_arg(args, tool, "a")?,
        extract_int_arg(args, tool, "b")?,
    ))
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds a and b."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        int_pair()
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let (a, b) = operands(args, self.name())?;
        a.checked_add(b)
            .map(|sum| json!(sum))
            .ok_or_else(|| ToolError::Execution("integer overflow".into()))
    }
}

pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply a and b."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        int_pair()
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let (a, b) = operands(args, self.name())?;
        a.checked_mul(b)
            .map(|product| json!(product))
            .ok_or_else(|| ToolError::Execution("integer overflow".into()))
    }
}

/// True division; the result is always a float.
pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide a and b."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        int_pair()
    }

    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        let (a, b) = operands(args, self.name())?;
        if b == 0 {
            return Err(ToolError::Execution("division by zero".into()));
        }
        Ok(json!(a as f64 / b as f64))
    }
}
