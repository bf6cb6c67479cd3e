//! Prompt domain
//!
//! System prompts and message builders for every brain role in a mirror run.

mod template;

pub use template::{MirrorPromptTemplate, PREVIOUS_ORIGINAL_MARKER};
