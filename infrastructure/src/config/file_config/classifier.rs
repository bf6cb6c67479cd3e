//! Intent classifier configuration from TOML (`[classifier]` section)

use mirror_application::classifiers::DEFAULT_CONFIDENCE_THRESHOLD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClassifierMode {
    /// Keyword rules only, no model call
    Heuristic,
    /// Ask a configured brain, falling back to heuristic when it is missing
    #[default]
    Brain,
}

/// Raw classifier configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClassifierConfig {
    pub mode: FileClassifierMode,
    /// Brain whose provider and credentials the classifier uses
    pub brain_id: String,
    /// Model override for the classifier call
    pub model: Option<String>,
    pub confidence_threshold: f64,
}

impl Default for FileClassifierConfig {
    fn default() -> Self {
        Self {
            mode: FileClassifierMode::Brain,
            brain_id: super::session::DEFAULT_ORIGINAL_BRAIN.to_string(),
            model: Some("claude-haiku-4-5-20251001".to_string()),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}
