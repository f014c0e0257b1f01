use crate::agent::ToolRegistry;
use crate::error::Result;
use crate::tools::register_arithmetic;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ARITHMETIC_PROMPT: &str =
    "You are a helpful assistant tasked with performing arithmetic on a set of inputs.";

pub const VISION_PROMPT: &str = "You are a multimodal AI assistant with the following abilities:

1. **Image analysis**: describe and analyse images in detail, including:
   - recognising objects, people and scenes
   - reading any text in the image
   - analysing colour, composition and style
   - answering specific questions about the image

2. **Mathematics**: carry out calculations and solve problems

3. **Conversation**: hold a natural conversation and answer questions

4. **Combined analysis**: reason over images and text together

Give accurate, detailed answers based on the user's input (text and/or images).";

/// The agent variants a user can pick from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AgentProfile {
    /// Arithmetic tools, no memory between turns.
    #[default]
    Basic,
    /// Arithmetic tools, thread persisted across turns.
    Memory,
    /// Text and image input, no tools.
    Vision,
    VisionMemory,
}

impl AgentProfile {
    pub const ALL: [AgentProfile; 4] = [
        AgentProfile::Basic,
        AgentProfile::Memory,
        AgentProfile::Vision,
        AgentProfile::VisionMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Memory => "memory",
            Self::Vision => "vision",
            Self::VisionMemory => "vision-memory",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Basic | Self::Memory => ARITHMETIC_PROMPT,
            Self::Vision | Self::VisionMemory => VISION_PROMPT,
        }
    }

    pub fn uses_tools(&self) -> bool {
        matches!(self, Self::Basic | Self::Memory)
    }

    pub fn persists(&self) -> bool {
        matches!(self, Self::Memory | Self::VisionMemory)
    }

    pub fn accepts_images(&self) -> bool {
        matches!(self, Self::Vision | Self::VisionMemory)
    }

    pub fn build_registry(&self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        if self.uses_tools() {
            register_arithmetic(&mut registry)?;
        }
        Ok(registry)
    }
}

impl std::fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.to_lowercase().replace('_', "-"))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown agent: {}. Available: basic, memory, vision, vision-memory",
                    s
                )
            })
    }
}
