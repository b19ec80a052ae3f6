//! Common types for LLM providers

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::llm::errors::LlmError;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// Models offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ModelId {
    /// Presentation order
    pub const ALL: [ModelId; 3] = [ModelId::Gpt4o, ModelId::Gpt4Turbo, ModelId::Gpt35Turbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Gpt4Turbo => "gpt-4-turbo",
            ModelId::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| {
                LlmError::ConfigError(format!(
                    "Unsupported model '{}' (use gpt-4o, gpt-4-turbo, or gpt-3.5-turbo)",
                    s
                ))
            })
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Finish reason for a completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// Response from an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    #[cfg(test)]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// Sampling parameters fixed per call site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CallParams {
    pub const REPHRASE: CallParams = CallParams {
        temperature: 0.3,
        max_tokens: 250,
    };
    pub const QUESTIONS: CallParams = CallParams {
        temperature: 0.7,
        max_tokens: 1000,
    };
    pub const SYNTHESIS: CallParams = CallParams {
        temperature: 0.7,
        max_tokens: 1000,
    };
}

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: ModelId,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// A system + user exchange, the only shape the discovery flow sends
    pub fn new(model: ModelId, system: &str, prompt: String, params: CallParams) -> Self {
        Self {
            model,
            messages: vec![Message::system(system), Message::user(prompt)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }

    /// Text of the last user message
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}
