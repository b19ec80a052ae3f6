//! Summary and next-steps synthesis

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use super::{complete, prompts, Outcome};
use crate::llm::{CallParams, LlmError, LlmProvider, ModelId};

/// Text shown in place of a synthesis when the model call fails
pub const GENERATION_ERROR_TEXT: &str = "Error generating content. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisKind {
    Summary,
    NextSteps,
}

impl SynthesisKind {
    fn prompt(&self, context: &str) -> String {
        match self {
            SynthesisKind::Summary => prompts::summary_prompt(context),
            SynthesisKind::NextSteps => prompts::next_steps_prompt(context),
        }
    }
}

impl fmt::Display for SynthesisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisKind::Summary => f.write_str("summary"),
            SynthesisKind::NextSteps => f.write_str("next_steps"),
        }
    }
}

/// User-facing replacement text for a failed synthesis
pub fn synthesis_error_text(error: &LlmError) -> String {
    match error {
        LlmError::MissingCredential => format!("Error: {}", error),
        _ => GENERATION_ERROR_TEXT.to_string(),
    }
}

pub struct Synthesizer<'a> {
    provider: &'a dyn LlmProvider,
    model: ModelId,
}

impl<'a> Synthesizer<'a> {
    pub fn new(provider: &'a dyn LlmProvider, model: ModelId) -> Self {
        Self { provider, model }
    }

    /// Free-text synthesis of `context`; an error text on failure
    pub async fn synthesize(&self, context: &str, kind: SynthesisKind) -> Outcome<String> {
        let result = complete(
            self.provider,
            self.model,
            prompts::DISCOVERY_SYSTEM_ROLE,
            kind.prompt(context),
            CallParams::SYNTHESIS,
            &kind.to_string(),
        )
        .await;

        if let Err(e) = &result {
            error!("Error generating {}: {}", kind, e);
        }
        Outcome::from_result(result, synthesis_error_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Reply, ScriptedProvider};

    #[tokio::test]
    async fn test_synthesize_selects_template_per_kind() {
        let provider =
            ScriptedProvider::with_replies([Reply::text(" Summary text \n"), Reply::text("Plan")]);
        let synthesizer = Synthesizer::new(&provider, ModelId::Gpt35Turbo);

        let summary = synthesizer.synthesize("ctx", SynthesisKind::Summary).await;
        let next_steps = synthesizer.synthesize("ctx", SynthesisKind::NextSteps).await;
        assert_eq!(summary.into_value(), "Summary text");
        assert_eq!(next_steps.into_value(), "Plan");

        let requests = provider.requests();
        assert!(requests[0].prompt().starts_with("Provide a concise technical summary"));
        assert!(requests[1].prompt().starts_with("Outline the next steps"));
        assert!(requests.iter().all(|r| r.temperature == 0.7 && r.max_tokens == 1000));
        assert!(requests.iter().all(|r| r.model == ModelId::Gpt35Turbo));
    }

    #[tokio::test]
    async fn test_synthesize_failure_returns_error_text() {
        let provider = ScriptedProvider::with_replies([Reply::RateLimited]);
        let synthesizer = Synthesizer::new(&provider, ModelId::Gpt4o);
        let outcome = synthesizer.synthesize("ctx", SynthesisKind::Summary).await;
        assert_eq!(outcome.value(), GENERATION_ERROR_TEXT);
        assert!(outcome.failure().is_some());
    }

    #[tokio::test]
    async fn test_synthesize_missing_credential_text() {
        let provider = ScriptedProvider::always(Reply::MissingCredential);
        let synthesizer = Synthesizer::new(&provider, ModelId::Gpt4o);
        let outcome = synthesizer.synthesize("ctx", SynthesisKind::NextSteps).await;
        assert!(outcome.value().starts_with("Error: OpenAI API key not found"));
    }
}
