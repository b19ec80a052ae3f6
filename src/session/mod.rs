//! Interview session state
//!
//! One [`SessionState`] per interview, passed explicitly to whatever drives
//! it. Nothing is persisted beyond the process lifetime.

mod activity;
mod state;

pub use activity::*;
pub use state::*;
