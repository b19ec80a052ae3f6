//! Context accumulation and prompt orchestration for discovery interviews
//!
//! Answers are folded into a [`ContextStore`] as declarative statements, the
//! combined context feeds question generation and synthesis, and every model
//! failure is converted into an [`Outcome`] carrying a documented fallback.

mod context;
mod outcome;
pub mod prompts;
mod questions;
mod rephrase;
mod synthesis;

pub use context::*;
pub use outcome::*;
pub use questions::*;
pub use rephrase::*;
pub use synthesis::*;

use tracing::{debug, info, warn};

use crate::llm::{CallParams, ChatRequest, FinishReason, LlmProvider, LlmResult, ModelId};

/// Send one system + user exchange and return the trimmed reply text
async fn complete(
    provider: &dyn LlmProvider,
    model: ModelId,
    system: &str,
    prompt: String,
    params: CallParams,
    call_site: &str,
) -> LlmResult<String> {
    debug!(
        "{} call via {} (model={}, temperature={}, max_tokens={})",
        call_site,
        provider.name(),
        model,
        params.temperature,
        params.max_tokens
    );

    let request = ChatRequest::new(model, system, prompt, params);
    let response = provider.chat_completion(request).await?;

    let usage = &response.usage;
    info!(
        "{} call completed: {} tokens ({} in, {} out)",
        call_site, usage.total_tokens, usage.input_tokens, usage.output_tokens
    );
    if response.finish_reason == Some(FinishReason::Length) {
        warn!("{} reply was cut off at {} tokens", call_site, params.max_tokens);
    }
    Ok(response.content.trim().to_string())
}
