//! Core application logic and orchestration
//!
//! The [`Assistant`] owns the interview's [`SessionState`] and the model
//! provider, runs each user action to completion, and reports the result
//! through [`AppEvent`] notices.

mod events;

pub use events::*;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    discovery::{
        is_complete_set, prompts::STATIC_QUESTIONS, ContextUpdate, FragmentKey, QaRephraser,
        QuestionGenerator, SynthesisKind, Synthesizer,
    },
    llm::{LlmProvider, ProviderFactory},
    session::{SessionError, SessionState},
};

/// Drives one interview against a model provider
pub struct Assistant {
    state: SessionState,
    provider: Arc<dyn LlmProvider>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl Assistant {
    /// Create an assistant backed by the provider described in `config`
    pub fn new(config: &Config) -> Result<Self> {
        debug!("Creating new Assistant instance");

        let provider = ProviderFactory::create_provider(config.provider_config())?;
        if !config.has_api_key() {
            warn!("No API key configured; set OPENAI_API_KEY or DISCOVERY_API_KEY");
        } else if let Err(e) = provider.validate_config() {
            // Not fatal: every model call reports it again and degrades.
            warn!("{}", e);
        }

        Ok(Self::with_provider(
            Arc::from(provider),
            SessionState::new(config.model),
        ))
    }

    pub fn with_provider(provider: Arc<dyn LlmProvider>, state: SessionState) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        info!(
            "Session {} started with {} ({})",
            state.id(),
            provider.name(),
            state.model()
        );
        Self {
            state,
            provider,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Take the notice receiver; only the first caller gets it
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<AppEvent>> {
        self.event_rx.take()
    }

    fn notify(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    fn report_update(&self, update: &ContextUpdate, success_message: Option<&str>) {
        let mut reported: Vec<&str> = Vec::new();
        for failure in &update.failures {
            if !reported.contains(&failure.message.as_str()) {
                reported.push(&failure.message);
                self.notify(AppEvent::error(format!(
                    "Error rephrasing QA pair: {}",
                    failure
                )));
            }
        }
        if let (true, Some(message)) = (update.updated, success_message) {
            self.notify(AppEvent::success(message));
        }
    }

    /// Fold answers to the static questions into the global context
    pub async fn submit_static_answers(&mut self, answers: &[String]) -> bool {
        let rephraser = QaRephraser::new(self.provider.as_ref(), self.state.model());
        let update = rephraser
            .update_context(
                self.state.context_mut(),
                &STATIC_QUESTIONS,
                answers,
                FragmentKey::GlobalContext,
            )
            .await;

        if !update.updated {
            self.notify(AppEvent::info(
                "Answer every technical discovery question before submitting.",
            ));
        }
        self.report_update(&update, Some("Responses submitted and context updated!"));
        update.updated
    }

    /// Fold the answers of one question set into the dynamic context.
    ///
    /// Every question in the set must be answered. Pairs already folded by
    /// an earlier round or submission are not appended again.
    pub async fn submit_question_set(&mut self, number: usize) -> Result<bool, SessionError> {
        let (questions, answers) = self.state.question_set_answers(number)?;
        let start = self
            .state
            .question_sets()
            .iter()
            .find(|set| set.number == number)
            .map(|set| set.start)
            .ok_or(SessionError::UnknownQuestionSet(number))?;

        if !is_complete_set(&questions, &answers) {
            self.notify(AppEvent::info(format!(
                "Answer every question in set {} before submitting.",
                number
            )));
            return Ok(false);
        }

        let pending: Vec<(usize, String, String)> = questions
            .into_iter()
            .zip(answers)
            .enumerate()
            .map(|(offset, (q, a))| (start + offset, q, a))
            .filter(|(index, _, _)| !self.state.is_folded(*index))
            .collect();

        if pending.is_empty() {
            debug!("Question set {} already folded", number);
            self.notify(AppEvent::info(format!(
                "Answers in set {} are already in the context.",
                number
            )));
            return Ok(true);
        }

        let rephraser = QaRephraser::new(self.provider.as_ref(), self.state.model());
        let update = rephraser
            .update_context(
                self.state.context_mut(),
                &pending.iter().map(|(_, q, _)| q.as_str()).collect::<Vec<_>>(),
                &pending.iter().map(|(_, _, a)| a.as_str()).collect::<Vec<_>>(),
                FragmentKey::DynamicContext,
            )
            .await;

        if update.updated {
            for (index, _, _) in &pending {
                self.state.mark_folded(*index);
            }
        }
        self.report_update(&update, Some("Answers submitted and context updated!"));
        Ok(update.updated)
    }

    /// Run one generation round; returns how many new questions were added
    pub async fn generate_questions(&mut self) -> usize {
        let rephraser = QaRephraser::new(self.provider.as_ref(), self.state.model());
        for (index, question, answer) in self.state.unfolded_pairs() {
            let update = rephraser
                .update_context(
                    self.state.context_mut(),
                    &[question],
                    &[answer],
                    FragmentKey::DynamicContext,
                )
                .await;
            if update.updated {
                self.state.mark_folded(index);
            }
            self.report_update(&update, None);
        }

        if self.state.context().is_empty() {
            debug!("Generating questions without any collected context");
        }
        let context = self.state.combined_context();
        let generator = QuestionGenerator::new(self.provider.as_ref(), self.state.model());
        let outcome = generator.generate(&context).await;
        if let Some(failure) = outcome.failure() {
            self.notify(AppEvent::error(format!("Error generating content: {}", failure)));
        }

        let added = self.state.add_questions(outcome.into_value()).len();
        self.state.advance_iteration();
        info!(
            "Question round finished: {} new, iteration now {}",
            added,
            self.state.iteration()
        );

        if added > 0 {
            self.notify(AppEvent::success(format!("Generated {} new questions!", added)));
        } else {
            self.notify(AppEvent::info("No new unique questions generated."));
        }
        added
    }

    async fn synthesize(&mut self, kind: SynthesisKind) -> String {
        let context = self.state.combined_context();
        let synthesizer = Synthesizer::new(self.provider.as_ref(), self.state.model());
        let outcome = synthesizer.synthesize(&context, kind).await;
        if let Some(failure) = outcome.failure() {
            self.notify(AppEvent::error(format!("Error generating content: {}", failure)));
        }
        outcome.into_value()
    }

    pub async fn generate_summary(&mut self) -> &str {
        let text = self.synthesize(SynthesisKind::Summary).await;
        self.state.set_summary(text);
        self.state.summary()
    }

    pub async fn generate_next_steps(&mut self) -> &str {
        let text = self.synthesize(SynthesisKind::NextSteps).await;
        self.state.set_next_steps(text);
        self.state.next_steps()
    }

    /// Discard the interview and start over with the same model
    pub fn reset(&mut self) {
        self.state.reset();
        info!("Session reset, new session {}", self.state.id());
        self.notify(AppEvent::info("Session cleared."));
    }
}
