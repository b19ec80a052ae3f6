//! Accumulated interview context

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Named slot of free text, listed in combination order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKey {
    Background,
    Notes,
    GlobalContext,
    DynamicContext,
}

impl FragmentKey {
    pub const ORDER: [FragmentKey; 4] = [
        FragmentKey::Background,
        FragmentKey::Notes,
        FragmentKey::GlobalContext,
        FragmentKey::DynamicContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKey::Background => "background",
            FragmentKey::Notes => "notes",
            FragmentKey::GlobalContext => "global_context",
            FragmentKey::DynamicContext => "dynamic_context",
        }
    }

    fn index(&self) -> usize {
        match self {
            FragmentKey::Background => 0,
            FragmentKey::Notes => 1,
            FragmentKey::GlobalContext => 2,
            FragmentKey::DynamicContext => 3,
        }
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FragmentKey::ORDER
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown context fragment: {}", s))
    }
}

/// Text fragments gathered during the interview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStore {
    fragments: [String; 4],
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FragmentKey) -> &str {
        &self.fragments[key.index()]
    }

    /// Append `text` on a new line. Whitespace-only text is ignored.
    pub fn append(&mut self, key: FragmentKey, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = &mut self.fragments[key.index()];
        *slot = format!("{}\n{}", slot, text).trim().to_string();
    }

    /// Replace a fragment outright (free-form background and notes)
    pub fn set(&mut self, key: FragmentKey, text: impl Into<String>) {
        self.fragments[key.index()] = text.into();
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }

    /// Fragments in fixed order, then each answered pair as `question - answer`.
    ///
    /// Pairs with a blank answer are left out. The whole blob is trimmed.
    pub fn combined<'a, I>(&self, answered: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let qa_context: String = answered
            .into_iter()
            .filter(|(_, answer)| super::is_answered(answer))
            .map(|(question, answer)| format!("\n{} - {}", question, answer))
            .collect();

        let [background, notes, global, dynamic] = &self.fragments;
        format!(
            "{}\n\n{}\n\n{}\n\n{}\n\n{}",
            background, notes, global, dynamic, qa_context
        )
        .trim()
        .to_string()
    }
}
