//! History entry entities

use crate::intent::IntentResult;
use crate::mirror::SynthesisResult;
use crate::stream::CompletedResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One brain's final answer within a recorded run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainResult {
    pub brain_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl BrainResult {
    pub fn from_response(
        brain_id: impl Into<String>,
        response: &CompletedResponse,
        latency_ms: Option<u64>,
    ) -> Self {
        Self {
            brain_id: brain_id.into(),
            text: response.text.clone(),
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            latency_ms,
        }
    }
}

/// A completed question and its answers (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub question: String,
    pub original: BrainResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenger: Option<BrainResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<SynthesisResult>,
}

impl HistoryEntry {
    /// Question shortened to `max` characters for tabular listings
    pub fn question_preview(&self, max: usize) -> String {
        if self.question.chars().count() <= max {
            return self.question.clone();
        }
        let keep = max.saturating_sub(3);
        let head: String = self.question.chars().take(keep).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(question: &str) -> HistoryEntry {
        HistoryEntry {
            id: "h1".to_string(),
            created_at: Utc::now(),
            question: question.to_string(),
            original: BrainResult::from_response(
                "original",
                &CompletedResponse::from_text("answer"),
                Some(12),
            ),
            challenger: None,
            intent: None,
            synthesis: None,
        }
    }

    #[test]
    fn test_question_preview_truncates() {
        let long = "x".repeat(100);
        let preview = entry(&long).question_preview(80);
        assert_eq!(preview.chars().count(), 80);
        assert!(preview.ends_with("..."));
        assert_eq!(entry("short").question_preview(80), "short");
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let json = serde_json::to_value(entry("q")).unwrap();
        assert!(json.get("challenger").is_none());
        assert_eq!(json["original"]["latency_ms"], 12);
    }
}
