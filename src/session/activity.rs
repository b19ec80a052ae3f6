//! Activity log derived from session state

use std::fmt;

use crate::discovery::FragmentKey;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEntry {
    StaticQuestionsAnswered,
    QuestionsGenerated(usize),
    DynamicAnswersProcessed,
    SummaryGenerated,
    NextStepsDefined,
}

impl ActivityEntry {
    pub fn collect(state: &SessionState) -> Vec<ActivityEntry> {
        let mut entries = Vec::new();
        if !state.context().get(FragmentKey::GlobalContext).is_empty() {
            entries.push(ActivityEntry::StaticQuestionsAnswered);
        }
        if !state.questions().is_empty() {
            entries.push(ActivityEntry::QuestionsGenerated(state.questions().len()));
        }
        if !state.context().get(FragmentKey::DynamicContext).is_empty() {
            entries.push(ActivityEntry::DynamicAnswersProcessed);
        }
        if !state.summary().is_empty() {
            entries.push(ActivityEntry::SummaryGenerated);
        }
        if !state.next_steps().is_empty() {
            entries.push(ActivityEntry::NextStepsDefined);
        }
        entries
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityEntry::StaticQuestionsAnswered => write!(f, "Static questions answered"),
            ActivityEntry::QuestionsGenerated(n) => write!(f, "Generated {} questions", n),
            ActivityEntry::DynamicAnswersProcessed => write!(f, "Processed dynamic Q&A"),
            ActivityEntry::SummaryGenerated => write!(f, "Summary generated"),
            ActivityEntry::NextStepsDefined => write!(f, "Next steps defined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_has_no_activity() {
        assert!(SessionState::default().activity().is_empty());
    }

    #[test]
    fn test_activity_follows_state() {
        let mut state = SessionState::default();
        state
            .context_mut()
            .append(FragmentKey::GlobalContext, "Runs on-prem VMware.");
        state.add_questions(vec!["A?".to_string(), "B?".to_string()]);
        state.set_next_steps("Migrate backups".to_string());

        let entries = state.activity();
        assert_eq!(
            entries,
            vec![
                ActivityEntry::StaticQuestionsAnswered,
                ActivityEntry::QuestionsGenerated(2),
                ActivityEntry::NextStepsDefined,
            ]
        );
        assert_eq!(entries[1].to_string(), "Generated 2 questions");
    }
}
