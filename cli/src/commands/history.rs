//! `history list|show|export`

use anyhow::{Context, Result};
use mirror_application::HistoryStore;
use mirror_presentation::ConsoleFormatter;
use std::path::Path;

pub async fn list(store: &dyn HistoryStore, limit: Option<usize>) -> Result<()> {
    let entries = store.list(limit).await.context("Could not read history")?;
    if entries.is_empty() {
        println!("No history yet.");
        return Ok(());
    }
    print!("{}", ConsoleFormatter::history_table(&entries));
    Ok(())
}

pub async fn show(store: &dyn HistoryStore, id: &str) -> Result<()> {
    let entry = store.get(id).await?;
    println!("{}", ConsoleFormatter::format_json(&entry));
    Ok(())
}

pub async fn export(store: &dyn HistoryStore, id: &str, file: &Path) -> Result<()> {
    let entry = store.get(id).await?;
    tokio::fs::write(file, ConsoleFormatter::format_json(&entry))
        .await
        .with_context(|| format!("Could not write {}", file.display()))?;
    println!("Exported history {} to {}.", id, file.display());
    Ok(())
}
