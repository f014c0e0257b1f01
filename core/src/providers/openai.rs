use crate::error::{AgentError, Result};
use crate::traits::{
    Content, ContentPart, Message, ModelClient, ModelRequest, ModelResponse, Role, ToolCall,
    ToolSpec,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<OpenAIContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAIContent<'a> {
    Text(&'a str),
    Parts(Vec<OpenAIContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: OpenAIImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct OpenAIImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAIFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionRequest<'a> {
    name: &'a str,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIToolFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

/// Chat-completions client for OpenAI and compatible endpoints.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f64>,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(api_key, build_http_client(None, DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_http_client(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn convert_messages<'a>(&self, messages: &'a [Message]) -> Vec<OpenAIMessage<'a>> {
        messages
            .iter()
            .map(|m| {
                let tool_calls = m.has_tool_calls().then(|| {
                    m.tool_calls()
                        .iter()
                        .map(|tc| OpenAIToolCallRequest {
                            id: &tc.id,
                            r#type: "function",
                            function: OpenAIFunctionRequest {
                                name: &tc.name,
                                arguments: serde_json::Value::Object(tc.arguments.clone())
                                    .to_string(),
                            },
                        })
                        .collect()
                });

                let content = match m.content() {
                    Content::Text(text) if text.is_empty() && m.has_tool_calls() => None,
                    Content::Text(text) => Some(OpenAIContent::Text(text)),
                    Content::Parts(parts) => Some(OpenAIContent::Parts(
                        parts
                            .iter()
                            .map(|p| match p {
                                ContentPart::Text { text } => OpenAIContentPart::Text { text },
                                ContentPart::ImageUrl { url } => OpenAIContentPart::ImageUrl {
                                    image_url: OpenAIImageUrl { url },
                                },
                            })
                            .collect(),
                    )),
                };

                OpenAIMessage {
                    role: wire_role(m.role()),
                    content,
                    tool_calls,
                    tool_call_id: m.tool_call_id(),
                }
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolSpec]) -> Vec<OpenAITool> {
        tools
            .iter()
            .map(|t| OpenAITool {
                r#type: "function".to_string(),
                function: OpenAIToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.json_schema(),
                },
            })
            .collect()
    }

    fn convert_response(response: OpenAIResponse) -> Result<ModelResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::MalformedResponse("no choices in response".into()))?;

        match choice.message.tool_calls {
            Some(calls) => {
                let calls = calls
                    .into_iter()
                    .map(|c| {
                        let raw = match c.function.arguments.trim() {
                            "" => "{}",
                            raw => raw,
                        };
                        let arguments: serde_json::Value =
                            serde_json::from_str(raw).map_err(|e| {
                                AgentError::MalformedResponse(format!(
                                    "arguments for {} are not valid JSON: {}",
                                    c.function.name, e
                                ))
                            })?;
                        if !arguments.is_object() {
                            return Err(AgentError::MalformedResponse(format!(
                                "arguments for {} are not a JSON object",
                                c.function.name
                            )));
                        }
                        Ok(ToolCall::new(c.id, c.function.name, arguments))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ModelResponse::ToolCallsRequested(calls))
            }
            None => Ok(ModelResponse::FinalAnswer(
                choice.message.content.unwrap_or_default(),
            )),
        }
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
        Role::Ai => "assistant",
        Role::Tool => "tool",
    }
}

pub fn build_http_client(proxy: Option<&str>, timeout_secs: u64) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(30));

    if let Some(proxy) = proxy {
        match reqwest::Proxy::all(proxy) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => tracing::warn!("Ignoring invalid proxy {}: {}", proxy, e),
        }
    }

    builder.build().unwrap_or_default()
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse> {
        let openai_request = OpenAIRequest {
            model: &self.model,
            messages: self.convert_messages(request.messages),
            tools: (!request.tools.is_empty()).then(|| Self::convert_tools(request.tools)),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::ModelTimeout(self.timeout.as_secs())
                } else {
                    AgentError::ModelUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::ModelUnavailable(format!(
                "OpenAI API error {}: {}",
                status, error_text
            )));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

        Self::convert_response(openai_response)
    }
}
