//! Folding question/answer pairs into documentation statements

use tracing::{debug, warn};

use super::{complete, prompts, ContextStore, Failure, FailureKind, FragmentKey, Outcome};
use crate::llm::{CallParams, LlmProvider, ModelId};

/// Statement used whenever the model cannot rephrase a pair
pub fn fallback_statement(question: &str, answer: &str) -> String {
    format!("{} - {}", question, answer)
}

/// Result of [`QaRephraser::update_context`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextUpdate {
    pub updated: bool,
    /// Failures behind any fallback statements that were appended
    pub failures: Vec<Failure>,
}

impl ContextUpdate {
    fn skipped() -> Self {
        Self::default()
    }
}

/// Whether text counts as an answer: anything but whitespace
pub fn is_answered(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Equal lengths and every question and answer present
pub fn is_complete_set<Q, A>(questions: &[Q], answers: &[A]) -> bool
where
    Q: AsRef<str>,
    A: AsRef<str>,
{
    questions.len() == answers.len()
        && questions.iter().all(|q| is_answered(q.as_ref()))
        && answers.iter().all(|a| is_answered(a.as_ref()))
}

/// Rephrases interview answers via the model
pub struct QaRephraser<'a> {
    provider: &'a dyn LlmProvider,
    model: ModelId,
}

impl<'a> QaRephraser<'a> {
    pub fn new(provider: &'a dyn LlmProvider, model: ModelId) -> Self {
        Self { provider, model }
    }

    /// Turn one pair into a statement; falls back to `question - answer`
    pub async fn rephrase(&self, question: &str, answer: &str) -> Outcome<String> {
        let result = complete(
            self.provider,
            self.model,
            prompts::WRITER_SYSTEM_ROLE,
            prompts::rephrase_prompt(question, answer),
            CallParams::REPHRASE,
            "rephrase",
        )
        .await;

        if let Err(e) = &result {
            warn!("Error rephrasing QA pair: {}", e);
        }
        Outcome::from_result(result, |_| fallback_statement(question, answer))
    }

    /// Rephrase pairs in order, skipping any with an empty side.
    ///
    /// Once a configuration failure is seen the remaining pairs fall back
    /// without another call.
    pub async fn rephrase_batch<'p, I>(&self, pairs: I) -> Vec<Outcome<String>>
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let mut statements = Vec::new();
        let mut configuration_failure: Option<Failure> = None;

        for (question, answer) in pairs {
            if !is_answered(question) || !is_answered(answer) {
                continue;
            }

            if let Some(failure) = &configuration_failure {
                statements.push(Outcome::Degraded {
                    value: fallback_statement(question, answer),
                    failure: failure.clone(),
                });
                continue;
            }

            let outcome = self.rephrase(question, answer).await;
            if let Some(failure) = outcome.failure() {
                if failure.kind == FailureKind::Configuration {
                    configuration_failure = Some(failure.clone());
                }
            }
            statements.push(outcome);
        }

        statements
    }

    /// Rephrase every pair and append the block to `key`.
    ///
    /// Only proceeds when the sequences have equal length and every question
    /// and answer is non-empty; otherwise the store is left untouched.
    pub async fn update_context<Q, A>(
        &self,
        store: &mut ContextStore,
        questions: &[Q],
        answers: &[A],
        key: FragmentKey,
    ) -> ContextUpdate
    where
        Q: AsRef<str>,
        A: AsRef<str>,
    {
        if !is_complete_set(questions, answers) {
            debug!("Skipping context update for {}: incomplete answers", key);
            return ContextUpdate::skipped();
        }

        let pairs = questions
            .iter()
            .map(|q| q.as_ref())
            .zip(answers.iter().map(|a| a.as_ref()));
        let outcomes = self.rephrase_batch(pairs).await;

        let failures: Vec<Failure> = outcomes
            .iter()
            .filter_map(|o| o.failure().cloned())
            .collect();
        let block = outcomes
            .into_iter()
            .map(Outcome::into_value)
            .collect::<Vec<_>>()
            .join("\n");

        if block.trim().is_empty() {
            return ContextUpdate::skipped();
        }

        store.append(key, &block);
        debug!("Appended {} bytes to {}", block.len(), key);
        ContextUpdate {
            updated: true,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Reply, ScriptedProvider};

    #[tokio::test]
    async fn test_rephrase_uses_model_statement() {
        let provider = ScriptedProvider::with_replies([Reply::text("  The org runs on Azure.  ")]);
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4Turbo);

        let outcome = rephraser.rephrase("Which cloud?", "Azure").await;
        assert_eq!(outcome, Outcome::Success("The org runs on Azure.".to_string()));

        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request.model, ModelId::Gpt4Turbo);
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_tokens, 250);
        assert_eq!(request.messages[0].content, prompts::WRITER_SYSTEM_ROLE);
        assert!(request.prompt().contains("Question: Which cloud? Answer: Azure"));
    }

    #[tokio::test]
    async fn test_rephrase_falls_back_on_failure() {
        for reply in [Reply::RateLimited, Reply::Unavailable, Reply::MissingCredential] {
            let provider = ScriptedProvider::with_replies([reply]);
            let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);
            let outcome = rephraser.rephrase("q", "a").await;
            assert_eq!(outcome.value(), "q - a");
            assert!(outcome.failure().is_some());
        }
    }

    #[tokio::test]
    async fn test_batch_skips_incomplete_pairs() {
        let provider = ScriptedProvider::with_replies([Reply::text("S1"), Reply::text("S3")]);
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);

        let statements: Vec<String> = rephraser
            .rephrase_batch([("Q1?", "A1"), ("Q2?", ""), ("", "A"), ("Q3?", "A3")])
            .await
            .into_iter()
            .map(Outcome::into_value)
            .collect();
        assert_eq!(statements, vec!["S1", "S3"]);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_stops_calling_after_missing_credential() {
        let provider = ScriptedProvider::always(Reply::MissingCredential);
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);

        let outcomes = rephraser
            .rephrase_batch([("Q1?", "A1"), ("Q2?", "A2"), ("Q3?", "A3")])
            .await;
        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2].value(), "Q3? - A3");
        assert!(outcomes
            .iter()
            .all(|o| o.failure().map(|f| f.kind) == Some(FailureKind::Configuration)));
    }

    #[tokio::test]
    async fn test_update_context_gate_leaves_store_unchanged() {
        let provider = ScriptedProvider::always(Reply::text("should not be used"));
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);
        let mut store = ContextStore::new();
        store.append(FragmentKey::GlobalContext, "existing");
        let before = store.clone();

        let cases: [(&[&str], &[&str]); 5] = [
            (&["Q1?", ""], &["A1", "A2"]),
            (&["Q1?", "Q2?"], &["A1", ""]),
            (&["Q1?", "Q2?"], &["A1", "  "]),
            (&["Q1?", "Q2?"], &["A1"]),
            (&[], &[]),
        ];
        for (questions, answers) in cases {
            let update = rephraser
                .update_context(&mut store, questions, answers, FragmentKey::GlobalContext)
                .await;
            assert!(!update.updated);
            assert_eq!(store, before);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_context_appends_joined_statements() {
        let provider = ScriptedProvider::with_replies([
            Reply::text("Statement about A1."),
            Reply::RateLimited,
        ]);
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);
        let mut store = ContextStore::new();

        let update = rephraser
            .update_context(
                &mut store,
                &["Q1?", "Q2?"],
                &["A1".to_string(), "A2".to_string()],
                FragmentKey::DynamicContext,
            )
            .await;

        assert!(update.updated);
        assert_eq!(update.failures.len(), 1);
        assert_eq!(
            store.get(FragmentKey::DynamicContext),
            "Statement about A1.\nQ2? - A2"
        );
    }

    #[tokio::test]
    async fn test_update_context_single_pair_into_global() {
        let provider = ScriptedProvider::with_replies([Reply::text("Statement about A1.")]);
        let rephraser = QaRephraser::new(&provider, ModelId::Gpt4o);
        let mut store = ContextStore::new();

        let update = rephraser
            .update_context(&mut store, &["Q1?"], &["A1"], FragmentKey::GlobalContext)
            .await;

        assert!(update.updated);
        assert_eq!(store.get(FragmentKey::GlobalContext), "Statement about A1.");
        assert!(store
            .combined(std::iter::empty())
            .contains("Statement about A1."));
    }
}
