//! Domain layer for adversarial-mirror
//!
//! This crate contains the core types and pure logic of a mirror run.
//! It has no dependencies on runtime, I/O or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Original**: the brain that answers the question directly
//! - **Challenger**: a second brain that critiques the original at a chosen
//!   [`Intensity`], optionally through a [`Persona`]
//! - **Judge**: an optional third brain that reconciles both answers and
//!   scores their agreement ([`SynthesisResult`])
//! - **Intent**: whether a question is worth mirroring at all ([`IntentResult`])

pub mod conversation;
pub mod core;
pub mod history;
pub mod intent;
pub mod mirror;
pub mod prompt;
pub mod stream;

// Re-export commonly used types
pub use conversation::{ConversationMessage, Role, Session};
pub use crate::core::error::DomainError;
pub use history::{BrainResult, HistoryEntry};
pub use intent::{IntentCategory, IntentResult, classify_heuristic, parse_intent_response};
pub use mirror::{Intensity, Persona, SynthesisResult, extract_agreement_score};
pub use prompt::{MirrorPromptTemplate, PREVIOUS_ORIGINAL_MARKER};
pub use stream::{CompletedResponse, StreamAccumulator, StreamChunk};
