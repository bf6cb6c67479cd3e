//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod brain;
pub mod classifier;
pub mod history_store;
pub mod mirror_event;
