//! OpenAI provider implementation

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::llm::{
    errors::{LlmError, LlmResult},
    provider::{utils, LlmProvider, ProviderClientOptions, ProviderConfig},
    types::{ChatRequest, FinishReason, MessageRole, ProviderResponse, TokenUsage},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat-completions provider
///
/// A missing API key does not prevent construction: every call then fails
/// with [`LlmError::MissingCredential`] before touching the network.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let options = ProviderClientOptions {
            timeout_seconds: config.timeout_seconds,
            ..ProviderClientOptions::default()
        };
        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(&options.user_agent);
        if let Some(seconds) = options.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingCredential)
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/v1/chat/completions", base_url)
    }

    /// Build the JSON body for a non-streaming completion
    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                json!({ "role": role, "content": msg.content })
            })
            .collect();

        json!({
            "model": request.model.as_str(),
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        })
    }

    /// Turn a decoded response into the provider-neutral shape
    fn into_provider_response(response: OpenAIResponse) -> LlmResult<ProviderResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ApiError("No choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => Some(FinishReason::Stop),
            Some("length") => Some(FinishReason::Length),
            Some("content_filter") => Some(FinishReason::ContentFilter),
            _ => None,
        };

        let usage = response
            .usage
            .map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            content,
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse> {
        let api_key = self.api_key()?;
        let body = Self::request_body(&request);

        debug!(
            "POST {} model={} max_tokens={}",
            self.endpoint(),
            request.model,
            request.max_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::TimeoutError(e.to_string())
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = utils::extract_error_message(response).await;
            return Err(utils::classify_status(status, message));
        }

        let text = response.text().await?;
        let decoded: OpenAIResponse = serde_json::from_str(&text)?;
        Self::into_provider_response(decoded)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn validate_config(&self) -> LlmResult<()> {
        self.api_key().map(|_| ())
    }
}

// OpenAI API types
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{CallParams, ModelId};

    fn provider(api_key: Option<&str>, base_url: Option<&str>) -> OpenAIProvider {
        OpenAIProvider::new(ProviderConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.map(str::to_string),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_carries_call_parameters() {
        let request = ChatRequest::new(
            ModelId::Gpt35Turbo,
            "sys",
            "hello".to_string(),
            CallParams::QUESTIONS,
        );
        let body = OpenAIProvider::request_body(&request);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_endpoint_respects_base_url() {
        assert_eq!(
            provider(Some("k"), None).endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            provider(Some("k"), Some("http://localhost:8080/")).endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_response_decoding_trims_content() {
        let raw = r#"{
            "choices": [{"message": {"content": "  A statement.  "}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        }"#;
        let decoded: OpenAIResponse = serde_json::from_str(raw).unwrap();
        let response = OpenAIProvider::into_provider_response(decoded).unwrap();
        assert_eq!(response.content, "A statement.");
        assert_eq!(response.usage.total_tokens, 13);
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn test_response_without_content_is_an_error() {
        let raw = r#"{"choices": [{"message": {"content": null}, "finish_reason": "stop"}]}"#;
        let decoded: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            OpenAIProvider::into_provider_response(decoded),
            Err(LlmError::EmptyResponse)
        ));

        let raw = r#"{"choices": []}"#;
        let decoded: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            OpenAIProvider::into_provider_response(decoded),
            Err(LlmError::ApiError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits_before_network() {
        // Unroutable base URL: reaching the transport would fail differently.
        let provider = provider(None, Some("http://127.0.0.1:9"));
        let request = ChatRequest::new(
            ModelId::Gpt4o,
            "sys",
            "prompt".to_string(),
            CallParams::SYNTHESIS,
        );
        assert!(matches!(
            provider.chat_completion(request).await,
            Err(LlmError::MissingCredential)
        ));

        let blank = self::provider(Some("  "), None);
        assert!(matches!(
            blank.validate_config(),
            Err(LlmError::MissingCredential)
        ));
    }
}
