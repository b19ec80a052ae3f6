//! LLM provider abstractions and implementations
//!
//! This module provides a single interface for sending chat-completion
//! requests, an OpenAI-compatible HTTP implementation, and a scripted
//! provider for tests.

pub mod errors;
pub mod openai;
pub mod provider;
#[cfg(test)]
pub mod scripted;
pub mod types;

pub use errors::*;
pub use provider::*;
#[cfg(test)]
pub use scripted::{Reply, ScriptedProvider};
pub use types::*;
