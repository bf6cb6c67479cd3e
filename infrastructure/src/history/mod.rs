//! Persistent run history

mod json_store;

pub use json_store::{JsonHistoryStore, MAX_ENTRIES};
