//! Transient notices emitted by assistant actions

use serde::{Deserialize, Serialize};

/// A user-facing notice; the shell prints and forgets it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// An action changed the session as intended
    Success { message: String },

    /// Nothing went wrong, but nothing changed either
    Info { message: String },

    /// A model call failed and a fallback was used
    Error { message: String },
}

impl AppEvent {
    pub fn success(message: impl Into<String>) -> Self {
        AppEvent::Success {
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        AppEvent::Info {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AppEvent::Error {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppEvent::Success { message }
            | AppEvent::Info { message }
            | AppEvent::Error { message } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AppEvent::Error { .. })
    }
}
