use crate::agent::ToolRegistry;
use crate::error::{Result, ToolError};
use crate::traits::ToolArgs;

pub mod arithmetic;

pub use arithmetic::{AddTool, DivideTool, MultiplyTool};

pub fn extract_int_arg(
    args: &ToolArgs,
    tool: &str,
    key: &str,
) -> std::result::Result<i64, ToolError> {
    match args.get(key) {
        None => Err(ToolError::invalid(
            tool,
            format!("missing integer parameter '{}'", key),
        )),
        Some(value) => value.as_i64().ok_or_else(|| {
            let reason = if value.is_u64() {
                format!("integer parameter '{}' out of range: {}", key, value)
            } else {
                format!("parameter '{}' expects integer, got {}", key, value)
            };
            ToolError::invalid(tool, reason)
        }),
    }
}

/// Registers `add`, `multiply` and `divide`.
pub fn register_arithmetic(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(AddTool)?;
    registry.register(MultiplyTool)?;
    registry.register(DivideTool)?;
    Ok(())
}
