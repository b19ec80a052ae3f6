//! Degrade-gracefully result type returned at component boundaries

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::LlmError;

/// Broad category of a swallowed model-call failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Detected before any call was attempted (missing credential, bad model)
    Configuration,
    /// Network, rate-limit or malformed response from the model service
    Upstream,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&LlmError> for Failure {
    fn from(error: &LlmError) -> Self {
        let kind = if error.is_configuration() {
            FailureKind::Configuration
        } else {
            FailureKind::Upstream
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Either the real value, or the documented fallback plus the reason for it.
///
/// Components never propagate model failures; callers always get a usable
/// value and may inspect [`Outcome::failure`] to surface a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Degraded { value: T, failure: Failure },
}

impl<T> Outcome<T> {
    /// Convert a model result, substituting `fallback` on error
    pub fn from_result(result: Result<T, LlmError>, fallback: impl FnOnce(&LlmError) -> T) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Degraded {
                value: fallback(&error),
                failure: Failure::from(&error),
            },
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Success(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Success(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Degraded { failure, .. } => Some(failure),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
