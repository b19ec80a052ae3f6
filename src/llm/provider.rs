//! Provider trait and factory for LLM providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm::{
    errors::{LlmError, LlmResult},
    openai::OpenAIProvider,
    types::{ChatRequest, ProviderResponse},
};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and get a response
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Validate the configuration
    fn validate_config(&self) -> LlmResult<()>;
}

/// Configuration for an LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: "openai".to_string(),
            api_key: None,
            base_url: None,
            timeout_seconds: None,
        }
    }
}

/// Factory for creating LLM providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a new provider from configuration
    pub fn create_provider(config: ProviderConfig) -> LlmResult<Box<dyn LlmProvider>> {
        match config.provider_type.as_str() {
            "openai" => {
                let provider = OpenAIProvider::new(config)?;
                Ok(Box::new(provider))
            }
            _ => Err(LlmError::ConfigError(format!(
                "Unsupported provider type: {}",
                config.provider_type
            ))),
        }
    }
}

/// Provider client options
#[derive(Debug, Clone)]
pub struct ProviderClientOptions {
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

impl Default for ProviderClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: format!(
                "{}/{}",
                crate::version::APP_NAME,
                crate::version::VERSION
            ),
        }
    }
}

/// Utility functions for provider implementations
pub mod utils {
    use super::*;

    /// Map an HTTP failure status onto the error taxonomy
    pub fn classify_status(status: u16, message: String) -> LlmError {
        match status {
            429 => LlmError::RateLimitError(message),
            401 | 403 => LlmError::AuthError(message),
            408 | 504 => LlmError::TimeoutError(message),
            400 if message.contains("context_length_exceeded") => {
                LlmError::ContextLimitError(message)
            }
            _ => LlmError::ApiError(message),
        }
    }

    /// Pull `error.message` out of an OpenAI-style error body, if there is one
    pub fn error_message_from_body(status: u16, body: &str) -> String {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(message) = json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
            {
                return format!("{}: {}", status, message);
            }
        }
        format!("{}: {}", status, body)
    }

    /// Extract error message from HTTP response
    pub async fn extract_error_message(response: reqwest::Response) -> String {
        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) => error_message_from_body(status, &text),
            Err(_) => format!("{}: Failed to read error response", status),
        }
    }
}
