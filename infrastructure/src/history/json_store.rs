//! JSON file history store.
//!
//! All entries live in one JSON document (`{"entries": [...]}`), newest
//! first. Writes go to a sibling temp file that is then renamed over the
//! original, so a crash never leaves a half-written history.

use async_trait::async_trait;
use mirror_application::{HistoryError, HistoryStore};
use mirror_domain::HistoryEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Oldest entries beyond this are dropped
pub const MAX_ENTRIES: usize = 200;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
}

pub struct JsonHistoryStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `$XDG_DATA_HOME/adversarial-mirror/history.json`
    pub fn default_location() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("adversarial-mirror").join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<HistoryDocument, HistoryError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HistoryDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(HistoryDocument::default());
        }
        serde_json::from_str(&text).map_err(|e| HistoryError::Corrupt(e.to_string()))
    }

    async fn write(&self, document: &HistoryDocument) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| HistoryError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn add(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        debug!("Recording history entry {}", entry.id);

        document.entries.insert(0, entry);
        document.entries.truncate(MAX_ENTRIES);
        self.write(&document).await
    }

    async fn list(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.read().await?.entries;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn get(&self, id: &str) -> Result<HistoryEntry, HistoryError> {
        self.read()
            .await?
            .entries
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mirror_domain::BrainResult;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            created_at: Utc::now(),
            question: format!("question {id}"),
            original: BrainResult {
                brain_id: "mock".into(),
                text: "answer".into(),
                input_tokens: None,
                output_tokens: None,
                latency_ms: Some(3),
            },
            challenger: None,
            intent: None,
            synthesis: None,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        assert!(store.list(None).await.unwrap().is_empty());
        assert!(matches!(store.get("x").await, Err(HistoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_newest_first_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("data").join("history.json"));
        store.add(entry("a")).await.unwrap();
        store.add(entry("b")).await.unwrap();

        let ids: Vec<_> = store
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get("a").await.unwrap().question, "question a");
        assert_eq!(store.list(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_caps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        for i in 0..(MAX_ENTRIES + 5) {
            store.add(entry(&i.to_string())).await.unwrap();
        }

        let entries = store.list(None).await.unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].id, (MAX_ENTRIES + 4).to_string());
        assert!(store.get("0").await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonHistoryStore::new(&path);
        assert!(matches!(store.list(None).await, Err(HistoryError::Corrupt(_))));
    }
}
