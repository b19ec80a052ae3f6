//! Follow-up question generation and deduplication

use std::collections::HashSet;
use tracing::{debug, error};

use super::{complete, prompts, Outcome};
use crate::llm::{CallParams, LlmProvider, ModelId};

/// Questions requested per generation round
pub const QUESTIONS_PER_ROUND: usize = 7;

/// Extract questions from a raw model reply.
///
/// Keeps trimmed lines that are non-empty and contain a `?` anywhere, in
/// order, capped at [`QUESTIONS_PER_ROUND`].
pub fn parse_questions(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains('?'))
        .take(QUESTIONS_PER_ROUND)
        .map(str::to_string)
        .collect()
}

/// Entries of `batch` not already in `existing`, first appearance order.
///
/// Matching is exact and case-sensitive. Repeats inside the batch collapse
/// to their first occurrence.
pub fn unseen_questions(existing: &[String], batch: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut fresh = Vec::new();
    for question in &batch {
        if seen.insert(question.as_str()) {
            fresh.push(question.clone());
        }
    }
    fresh
}

/// Requests batches of follow-up questions from the model
pub struct QuestionGenerator<'a> {
    provider: &'a dyn LlmProvider,
    model: ModelId,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(provider: &'a dyn LlmProvider, model: ModelId) -> Self {
        Self { provider, model }
    }

    /// Generate up to seven questions; empty on failure
    pub async fn generate(&self, context: &str) -> Outcome<Vec<String>> {
        let result = complete(
            self.provider,
            self.model,
            prompts::DISCOVERY_SYSTEM_ROLE,
            prompts::questions_prompt(context),
            CallParams::QUESTIONS,
            "questions",
        )
        .await
        .map(|raw| parse_questions(&raw));

        match &result {
            Ok(questions) => debug!("Parsed {} questions from reply", questions.len()),
            Err(e) => error!("Error generating questions: {}", e),
        }
        Outcome::from_result(result, |_| Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FailureKind;
    use crate::llm::{Reply, ScriptedProvider};

    #[test]
    fn test_parse_keeps_question_lines_in_order() {
        let raw = "Hello\nWhat is X?\n\nAnother line?\nno mark here";
        assert_eq!(parse_questions(raw), vec!["What is X?", "Another line?"]);
    }

    #[test]
    fn test_parse_is_permissive_about_mark_position() {
        let raw = "1. Is it? Maybe not\n  - What about Y?  \r\nWhy";
        assert_eq!(
            parse_questions(raw),
            vec!["1. Is it? Maybe not", "- What about Y?"]
        );
    }

    #[test]
    fn test_parse_truncates_to_seven() {
        let raw: String = (1..=10).map(|i| format!("Question {}?\n", i)).collect();
        let questions = parse_questions(&raw);
        assert_eq!(questions.len(), 7);
        assert_eq!(questions[0], "Question 1?");
        assert_eq!(questions[6], "Question 7?");
    }

    #[test]
    fn test_unseen_questions_filters_existing() {
        let existing = vec!["Q_new1?".to_string()];
        let fresh = unseen_questions(
            &existing,
            vec!["Q_new1?".to_string(), "Q_new2?".to_string()],
        );
        assert_eq!(fresh, vec!["Q_new2?"]);
    }

    #[test]
    fn test_unseen_questions_is_case_sensitive_and_collapses_repeats() {
        let existing = vec!["What is X?".to_string()];
        let fresh = unseen_questions(
            &existing,
            vec![
                "what is x?".to_string(),
                "B?".to_string(),
                "what is x?".to_string(),
                "What is X?".to_string(),
            ],
        );
        assert_eq!(fresh, vec!["what is x?", "B?"]);
    }

    #[tokio::test]
    async fn test_generate_parses_reply_and_uses_question_params() {
        let provider = ScriptedProvider::with_replies([Reply::text(
            "Here are your questions:\n1. Which SIEM do you use?\n2. How are backups tested?",
        )]);
        let generator = QuestionGenerator::new(&provider, ModelId::Gpt4o);

        let outcome = generator.generate("Background text").await;
        assert!(outcome.is_success());
        assert_eq!(
            outcome.into_value(),
            vec!["1. Which SIEM do you use?", "2. How are backups tested?"]
        );

        let requests = provider.requests();
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[0].messages[0].content, prompts::DISCOVERY_SYSTEM_ROLE);
        assert!(requests[0].prompt().ends_with("Background text"));
    }

    #[tokio::test]
    async fn test_generate_failure_yields_empty_batch() {
        let provider = ScriptedProvider::with_replies([Reply::Unavailable]);
        let generator = QuestionGenerator::new(&provider, ModelId::Gpt4o);
        let outcome = generator.generate("ctx").await;
        assert!(outcome.value().is_empty());
        assert_eq!(outcome.failure().map(|f| f.kind), Some(FailureKind::Upstream));
    }
}
