//! Past mirror runs, as stored by the history collaborator

pub mod entry;

pub use entry::{BrainResult, HistoryEntry};
