//! Scripted provider that replays canned replies
//!
//! Every request is recorded so callers can inspect prompts and sampling parameters.

use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::llm::{
    errors::{LlmError, LlmResult},
    provider::LlmProvider,
    types::{ChatRequest, ProviderResponse},
};

/// One canned reply
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    RateLimited,
    Unavailable,
    MissingCredential,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    fn into_result(self) -> LlmResult<ProviderResponse> {
        match self {
            Reply::Text(text) => Ok(ProviderResponse::from_text(text)),
            Reply::RateLimited => Err(LlmError::RateLimitError(
                "429: You exceeded your current quota".to_string(),
            )),
            Reply::Unavailable => Err(LlmError::ApiError(
                "503: The server is overloaded".to_string(),
            )),
            Reply::MissingCredential => Err(LlmError::MissingCredential),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    fallback: Option<Reply>,
    requests: Vec<ChatRequest>,
}

/// Provider answering from a queue of [`Reply`] values
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies, consumed in order
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let provider = Self::new();
        for reply in replies {
            provider.push(reply);
        }
        provider
    }

    /// Reply used once the queue is empty
    pub fn always(reply: Reply) -> Self {
        let provider = Self::new();
        provider.lock().fallback = Some(reply);
        provider
    }

    pub fn push(&self, reply: Reply) {
        self.lock().replies.push_back(reply);
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not poison every later assertion.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat_completion(&self, request: ChatRequest) -> LlmResult<ProviderResponse> {
        let reply = {
            let mut script = self.lock();
            script.requests.push(request);
            script
                .replies
                .pop_front()
                .or_else(|| script.fallback.clone())
        };

        match reply {
            Some(reply) => reply.into_result(),
            None => Err(LlmError::ApiError("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn validate_config(&self) -> LlmResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{CallParams, ModelId};

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest::new(
            ModelId::Gpt4o,
            "sys",
            prompt.to_string(),
            CallParams::REPHRASE,
        )
    }

    #[tokio::test]
    async fn test_replies_in_order_then_fallback() {
        let provider = ScriptedProvider::with_replies([Reply::text("one"), Reply::RateLimited]);
        assert_eq!(
            provider.chat_completion(request("a")).await.unwrap().content,
            "one"
        );
        assert!(provider.chat_completion(request("b")).await.is_err());
        assert!(matches!(
            provider.chat_completion(request("c")).await,
            Err(LlmError::ApiError(_))
        ));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests()[1].prompt(), "b");
    }

    #[tokio::test]
    async fn test_always_repeats() {
        let provider = ScriptedProvider::always(Reply::text("same"));
        for _ in 0..3 {
            assert_eq!(
                provider.chat_completion(request("x")).await.unwrap().content,
                "same"
            );
        }
    }
}
