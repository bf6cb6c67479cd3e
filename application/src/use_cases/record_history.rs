//! Folding a run's events into a history entry

use crate::ports::mirror_event::{BrainRole, MirrorEvent};
use chrono::Utc;
use mirror_domain::{BrainResult, HistoryEntry, IntentResult, SynthesisResult};
use std::time::Instant;
use uuid::Uuid;

/// Watches the events of one run and builds its [`HistoryEntry`].
pub struct HistoryRecorder {
    question: String,
    started: Instant,
    original: Option<BrainResult>,
    challenger: Option<BrainResult>,
    intent: Option<IntentResult>,
    synthesis: Option<SynthesisResult>,
}

impl HistoryRecorder {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            started: Instant::now(),
            original: None,
            challenger: None,
            intent: None,
            synthesis: None,
        }
    }

    pub fn observe(&mut self, event: &MirrorEvent) {
        match event {
            MirrorEvent::Classified { result } => self.intent = Some(result.clone()),
            MirrorEvent::BackendComplete {
                role,
                brain_id,
                response,
            } => {
                let latency_ms = u64::try_from(self.started.elapsed().as_millis()).ok();
                let result = Some(BrainResult::from_response(brain_id, response, latency_ms));
                match role {
                    BrainRole::Original => self.original = result,
                    BrainRole::Challenger => self.challenger = result,
                }
            }
            MirrorEvent::SynthesisComplete { result } => self.synthesis = Some(result.clone()),
            _ => {}
        }
    }

    /// The finished entry; `None` if the original never completed
    pub fn finish(self) -> Option<HistoryEntry> {
        Some(HistoryEntry {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            question: self.question,
            original: self.original?,
            challenger: self.challenger,
            intent: self.intent,
            synthesis: self.synthesis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mirror_event::MirrorError;
    use mirror_domain::{CompletedResponse, IntentCategory};

    fn complete(role: BrainRole, id: &str, text: &str) -> MirrorEvent {
        MirrorEvent::BackendComplete {
            role,
            brain_id: id.to_string(),
            response: CompletedResponse::from_text(text),
        }
    }

    #[test]
    fn test_records_full_run() {
        let mut recorder = HistoryRecorder::new("Which?");
        recorder.observe(&MirrorEvent::Classified {
            result: IntentResult::new(IntentCategory::Analysis, true, 0.8, "Open."),
        });
        recorder.observe(&complete(BrainRole::Challenger, "gpt", "B"));
        recorder.observe(&complete(BrainRole::Original, "claude", "A"));
        recorder.observe(&MirrorEvent::SynthesisComplete {
            result: SynthesisResult {
                text: "AGREEMENT: 10%".into(),
                agreement_score: Some(10),
                ..Default::default()
            },
        });
        recorder.observe(&MirrorEvent::AllComplete);

        let entry = recorder.finish().unwrap();
        assert_eq!(entry.question, "Which?");
        assert_eq!(entry.original.brain_id, "claude");
        assert_eq!(entry.original.text, "A");
        assert_eq!(entry.challenger.unwrap().text, "B");
        assert_eq!(entry.synthesis.unwrap().agreement_score, Some(10));
        assert!(entry.intent.is_some());
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_same_brain_on_both_sides() {
        let mut recorder = HistoryRecorder::new("q");
        recorder.observe(&complete(BrainRole::Challenger, "mock", "challenger first"));
        recorder.observe(&complete(BrainRole::Original, "mock", "original second"));

        let entry = recorder.finish().unwrap();
        assert_eq!(entry.original.text, "original second");
        assert_eq!(entry.challenger.unwrap().text, "challenger first");
    }

    #[test]
    fn test_failed_run_has_no_entry() {
        let mut recorder = HistoryRecorder::new("q");
        recorder.observe(&MirrorEvent::Error {
            cause: MirrorError::Cancelled,
        });
        assert!(recorder.finish().is_none());
    }
}
