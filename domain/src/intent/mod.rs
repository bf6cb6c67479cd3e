//! Intent classification domain
//!
//! Decides whether a question benefits from an adversarial second opinion.
//! Factual lookups, arithmetic, code tasks and small talk go straight to the
//! original brain; opinion, analysis, interpretation and prediction are
//! mirrored.

pub mod entities;
pub mod heuristic;
pub mod parsing;

pub use entities::{IntentCategory, IntentResult};
pub use heuristic::classify_heuristic;
pub use parsing::parse_intent_response;
