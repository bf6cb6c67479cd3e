//! Intent classifier implementations
//!
//! Both live here rather than in infrastructure: neither does I/O of its own.
//! The brain classifier talks to whatever [`BrainAdapter`](crate::ports::brain::BrainAdapter)
//! it is handed.

mod brain;
mod heuristic;

pub use brain::{BrainIntentClassifier, DEFAULT_CONFIDENCE_THRESHOLD};
pub use heuristic::HeuristicIntentClassifier;
