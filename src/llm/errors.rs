//! Error types for LLM providers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("OpenAI API key not found. Please set the OPENAI_API_KEY environment variable.")]
    MissingCredential,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Context limit exceeded: {0}")]
    ContextLimitError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Model returned no content")]
    EmptyResponse,
}

impl LlmError {
    /// Whether the failure was detected before any request left the process
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingCredential | LlmError::ConfigError(_))
    }
}

pub type LlmResult<T> = Result<T, LlmError>;
