//! Failure classification.
//!
//! This module encapsulates the mapping from raw strategy failure messages to
//! the structured error taxonomy, so that the orchestrator and the serving
//! layer share a consistent policy for "try another strategy" versus "give up".

mod code;
mod rules;

pub use code::{ErrorCode, ErrorDetail};
pub use rules::{classify, is_permanent};
