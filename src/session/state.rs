//! In-memory state of one discovery interview

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

use crate::discovery::{
    is_answered, unseen_questions, ContextStore, FragmentKey, QUESTIONS_PER_ROUND,
};
use crate::llm::ModelId;
use crate::session::ActivityEntry;

/// Generated questions are shown in sets of this size
pub const QUESTION_SET_SIZE: usize = QUESTIONS_PER_ROUND;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No generated question #{0}")]
    UnknownQuestion(usize),

    #[error("No question set {0}")]
    UnknownQuestionSet(usize),
}

/// A contiguous group of generated questions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet<'a> {
    /// 1-based set number
    pub number: usize,
    /// Index of the first question in the whole sequence
    pub start: usize,
    pub questions: &'a [String],
}

/// State of one interview, owned by whoever drives it
#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    started_at: DateTime<Utc>,
    context: ContextStore,
    generated_questions: Vec<String>,
    answers: HashMap<usize, String>,
    folded: HashSet<usize>,
    summary: String,
    next_steps: String,
    model: ModelId,
    iteration: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ModelId::default())
    }
}

impl SessionState {
    pub fn new(model: ModelId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            context: ContextStore::new(),
            generated_questions: Vec::new(),
            answers: HashMap::new(),
            folded: HashSet::new(),
            summary: String::new(),
            next_steps: String::new(),
            model,
            iteration: 1,
        }
    }

    /// Start a fresh interview, keeping the selected model
    pub fn reset(&mut self) {
        *self = Self::new(self.model);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextStore {
        &mut self.context
    }

    pub fn set_background(&mut self, text: impl Into<String>) {
        self.context.set(FragmentKey::Background, text);
    }

    pub fn set_notes(&mut self, text: impl Into<String>) {
        self.context.set(FragmentKey::Notes, text);
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn advance_iteration(&mut self) {
        self.iteration += 1;
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn set_summary(&mut self, text: String) {
        self.summary = text;
    }

    pub fn next_steps(&self) -> &str {
        &self.next_steps
    }

    pub fn set_next_steps(&mut self, text: String) {
        self.next_steps = text;
    }

    pub fn questions(&self) -> &[String] {
        &self.generated_questions
    }

    /// Append the previously unseen entries of `batch`; returns them
    pub fn add_questions(&mut self, batch: Vec<String>) -> Vec<String> {
        let fresh = unseen_questions(&self.generated_questions, batch);
        self.generated_questions.extend(fresh.iter().cloned());
        fresh
    }

    /// Record the answer to question `index`; blank text clears it
    pub fn answer_question(&mut self, index: usize, text: impl Into<String>) -> Result<(), SessionError> {
        if index >= self.generated_questions.len() {
            return Err(SessionError::UnknownQuestion(index));
        }
        let text = text.into();
        if !is_answered(&text) {
            self.answers.remove(&index);
        } else {
            self.answers.insert(index, text);
        }
        // A changed answer is folded again on the next round.
        self.folded.remove(&index);
        Ok(())
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// Answered generated questions in generation order
    pub fn answered_pairs(&self) -> impl Iterator<Item = (usize, &str, &str)> + '_ {
        self.generated_questions
            .iter()
            .enumerate()
            .filter_map(move |(index, question)| {
                self.answer(index)
                    .filter(|answer| is_answered(answer))
                    .map(|answer| (index, question.as_str(), answer))
            })
    }

    /// Answered pairs not yet folded into the dynamic context
    pub fn unfolded_pairs(&self) -> Vec<(usize, String, String)> {
        self.answered_pairs()
            .filter(|(index, _, _)| !self.folded.contains(index))
            .map(|(index, q, a)| (index, q.to_string(), a.to_string()))
            .collect()
    }

    pub fn is_folded(&self, index: usize) -> bool {
        self.folded.contains(&index)
    }

    pub fn mark_folded(&mut self, index: usize) {
        self.folded.insert(index);
    }

    /// Fragments plus answered generated questions, recomputed on every call
    pub fn combined_context(&self) -> String {
        self.context
            .combined(self.answered_pairs().map(|(_, q, a)| (q, a)))
    }

    pub fn question_sets(&self) -> Vec<QuestionSet<'_>> {
        self.generated_questions
            .chunks(QUESTION_SET_SIZE)
            .enumerate()
            .map(|(i, questions)| QuestionSet {
                number: i + 1,
                start: i * QUESTION_SET_SIZE,
                questions,
            })
            .collect()
    }

    /// Questions of set `number` with their answers (empty when unanswered)
    pub fn question_set_answers(
        &self,
        number: usize,
    ) -> Result<(Vec<String>, Vec<String>), SessionError> {
        let set = self
            .question_sets()
            .into_iter()
            .find(|set| set.number == number)
            .ok_or(SessionError::UnknownQuestionSet(number))?;

        let questions = set.questions.to_vec();
        let answers = (set.start..set.start + set.questions.len())
            .map(|index| self.answer(index).unwrap_or_default().to_string())
            .collect();
        Ok((questions, answers))
    }

    pub fn activity(&self) -> Vec<ActivityEntry> {
        ActivityEntry::collect(self)
    }
}
