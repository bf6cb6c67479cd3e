//! History store port

use async_trait::async_trait;
use mirror_domain::HistoryEntry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History file is corrupt: {0}")]
    Corrupt(String),

    #[error("No history entry with id {0}")]
    NotFound(String),
}

/// Persistent record of past mirror runs, newest first
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    async fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, HistoryError>;

    async fn get(&self, id: &str) -> Result<HistoryEntry, HistoryError>;
}
