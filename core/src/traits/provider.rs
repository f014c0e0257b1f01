use crate::error::Result;
use crate::traits::ToolSpec;
use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Human => write!(f, "human"),
            Self::Ai => write!(f, "ai"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Inline image as a `data:` URL.
    pub fn image_data(bytes: &[u8], mime: &str) -> Self {
        Self::ImageUrl {
            url: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
        }
    }

    pub fn image_file(path: &Path) -> anyhow::Result<Self> {
        let mime = image_mime(path).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported image type: {} (expected png, jpg, gif or webp)",
                path.display()
            )
        })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        Ok(Self::image_data(&bytes, mime))
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Text view of the content; image parts are skipped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn has_images(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::ImageUrl { .. })),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of a conversation. Fields are private so a message cannot be
/// changed once it has been built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    role: Role,
    content: Content,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text(content.into()),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::plain(Role::Human, content)
    }

    pub fn human_with_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::Human,
            content: Content::Parts(parts),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::plain(Role::Ai, content)
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Ai,
            content: Content::Text(content.into()),
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Content::Text(content.into()),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    FinalAnswer(String),
    ToolCallsRequested(Vec<ToolCall>),
}

#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// The only seam through which the agent talks to a language model.
/// Implementations must not run tools themselves.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: ModelRequest<'_>) -> Result<ModelResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parts_text_skips_images() {
        let msg = Message::human_with_parts(vec![
            ContentPart::Text {
                text: "what is in this picture?".into(),
            },
            ContentPart::ImageUrl {
                url: "data:image/png;base64,AAAA".into(),
            },
        ]);
        assert_eq!(msg.text(), "what is in this picture?");
        assert!(msg.content().has_images());
    }

    #[test]
    fn image_data_url() {
        let part = ContentPart::image_data(b"hi", "image/png");
        assert_eq!(
            part,
            ContentPart::ImageUrl {
                url: "data:image/png;base64,aGk=".into()
            }
        );
    }

    #[test]
    fn image_mime_from_extension() {
        assert_eq!(image_mime(Path::new("a/cat.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("cat.webp")), Some("image/webp"));
        assert_eq!(image_mime(Path::new("cat.bmp")), None);
        assert!(ContentPart::image_file(Path::new("cat.bmp")).is_err());
    }

    #[test]
    fn tool_call_ignores_non_object_arguments() {
        let call = ToolCall::new("c1", "add", json!([1, 2]));
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn message_serializes_role_lowercase() {
        let value = serde_json::to_value(Message::ai("5")).unwrap();
        assert_eq!(value, json!({"role": "ai", "content": "5"}));
    }

    #[test]
    fn multimodal_message_deserializes() {
        let raw = json!({
            "role": "human",
            "content": [
                {"type": "text", "text": "hi"},
                {"type": "image_url", "url": "https://example.com/cat.jpg"}
            ]
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.role(), Role::Human);
        assert!(msg.content().has_images());
    }
}
