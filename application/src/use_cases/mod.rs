//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod record_history;
pub mod run_mirror;
