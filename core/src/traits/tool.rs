use crate::error::ToolError;
use crate::traits::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub type ToolArgs = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Integer,
    Number,
    String,
    Boolean,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Integer => value.is_i64(),
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    /// JSON schema object for the wire. Every parameter is required.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.kind.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Checks arity and types of `args` against the declared parameters.
    pub fn validate(&self, args: &ToolArgs) -> Result<(), ToolError> {
        for param in &self.parameters {
            match args.get(&param.name) {
                None => {
                    return Err(ToolError::invalid(
                        &self.name,
                        format!("missing parameter '{}'", param.name),
                    ));
                }
                Some(value)
                    if param.kind == ParamKind::Integer && value.is_u64() && !value.is_i64() =>
                {
                    return Err(ToolError::invalid(
                        &self.name,
                        format!(
                            "integer parameter '{}' out of range: {}",
                            param.name, value
                        ),
                    ));
                }
                Some(value) if !param.kind.accepts(value) => {
                    return Err(ToolError::invalid(
                        &self.name,
                        format!(
                            "parameter '{}' expects {}, got {}",
                            param.name, param.kind, value
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(extra) = args
            .keys()
            .find(|k| !self.parameters.iter().any(|p| &p.name == *k))
        {
            return Err(ToolError::invalid(
                &self.name,
                format!("unexpected parameter '{}'", extra),
            ));
        }

        Ok(())
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Vec<ParamSpec>;

    /// Runs the tool. `args` has already been validated against `parameters`.
    async fn call(&self, args: &ToolArgs) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub call_id: String,
    pub name: String,
    pub outcome: Result<Value, ToolError>,
}

impl ToolCallResult {
    pub fn success(call_id: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            outcome: Ok(value),
        }
    }

    pub fn failure(call_id: impl Into<String>, name: impl Into<String>, error: ToolError) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Text the model sees for this result.
    pub fn content(&self) -> String {
        match &self.outcome {
            Ok(Value::String(s)) => s.clone(),
            Ok(value) => value.to_string(),
            Err(e) => e.to_string(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::tool_result(self.call_id.clone(), self.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_spec() -> ToolSpec {
        ToolSpec {
            name: "add".into(),
            description: "Adds a and b.".into(),
            parameters: vec![
                ParamSpec::new("a", ParamKind::Integer, "first int"),
                ParamSpec::new("b", ParamKind::Integer, "second int"),
            ],
        }
    }

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn schema_lists_params_as_required() {
        let schema = pair_spec().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["a"]["type"], "integer");
        assert_eq!(schema["required"], json!(["a", "b"]));
    }

    #[test]
    fn validate_accepts_matching_args() {
        assert!(pair_spec().validate(&args(json!({"a": 2, "b": 3}))).is_ok());
    }

    #[test]
    fn validate_reports_missing_param() {
        let err = pair_spec().validate(&args(json!({"a": 2}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments for add: missing parameter 'b'"
        );
    }

    #[test]
    fn validate_rejects_float_for_integer() {
        let err = pair_spec()
            .validate(&args(json!({"a": 2.0, "b": 3})))
            .unwrap_err();
        assert!(matches!(err, ToolError::ArgumentValidation { .. }));
    }

    #[test]
    fn validate_rejects_string_for_integer() {
        let err = pair_spec()
            .validate(&args(json!({"a": "2", "b": 3})))
            .unwrap_err();
        assert!(err.to_string().contains("expects integer"));
    }

    #[test]
    fn validate_reports_integer_out_of_range() {
        let err = pair_spec()
            .validate(&args(json!({"a": 18446744073709551615u64, "b": 1})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments for add: integer parameter 'a' out of range: 18446744073709551615"
        );
        assert!(!ParamKind::Integer.accepts(&json!(u64::MAX)));
        assert!(ParamKind::Integer.accepts(&json!(i64::MAX)));
    }

    #[test]
    fn validate_rejects_extra_param() {
        let err = pair_spec()
            .validate(&args(json!({"a": 1, "b": 2, "c": 3})))
            .unwrap_err();
        assert!(err.to_string().contains("unexpected parameter 'c'"));
    }

    #[test]
    fn number_accepts_integers() {
        assert!(ParamKind::Number.accepts(&json!(4)));
        assert!(ParamKind::Number.accepts(&json!(4.5)));
        assert!(!ParamKind::Integer.accepts(&json!(4.5)));
    }

    #[test]
    fn result_content_rendering() {
        let ok = ToolCallResult::success("c1", "add", json!(5));
        assert_eq!(ok.content(), "5");

        let text = ToolCallResult::success("c2", "echo", json!("hello"));
        assert_eq!(text.content(), "hello");

        let failed = ToolCallResult::failure(
            "c3",
            "divide",
            ToolError::Execution("division by zero".into()),
        );
        assert!(!failed.is_success());
        let msg = failed.to_message();
        assert_eq!(msg.tool_call_id(), Some("c3"));
        assert_eq!(msg.text(), "division by zero");
    }
}
