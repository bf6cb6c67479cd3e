//! Events emitted by a mirror run
//!
//! A run is observed exclusively through these events. Exactly one terminal
//! event (`AllComplete` or `Error`) ends every run that still has a consumer.

use super::brain::BrainError;
use mirror_domain::{CompletedResponse, IntentResult, StreamChunk, SynthesisResult};
use thiserror::Error;

/// Why a mirror run stopped early
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MirrorError {
    #[error("Brain '{brain_id}' failed: {source}")]
    Backend {
        brain_id: String,
        #[source]
        source: BrainError,
    },

    #[error("Judge '{brain_id}' failed: {source}")]
    Judge {
        brain_id: String,
        #[source]
        source: BrainError,
    },

    #[error("Cancelled")]
    Cancelled,

    #[error("Event consumer went away")]
    ConsumerGone,
}

impl MirrorError {
    /// Backend failure, folding a cancelled source into [`MirrorError::Cancelled`]
    pub fn backend(brain_id: impl Into<String>, source: BrainError) -> Self {
        if source.is_cancelled() {
            return MirrorError::Cancelled;
        }
        MirrorError::Backend {
            brain_id: brain_id.into(),
            source,
        }
    }

    pub fn judge(brain_id: impl Into<String>, source: BrainError) -> Self {
        if source.is_cancelled() {
            return MirrorError::Cancelled;
        }
        MirrorError::Judge {
            brain_id: brain_id.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MirrorError::Cancelled)
    }
}

/// Which side of a run a primary brain answers for.
///
/// Brain ids alone cannot tell the sides apart when one brain plays both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrainRole {
    Original,
    Challenger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
    Classifying,
    Classified {
        result: IntentResult,
    },
    StreamChunk {
        role: BrainRole,
        brain_id: String,
        chunk: StreamChunk,
    },
    BackendComplete {
        role: BrainRole,
        brain_id: String,
        response: CompletedResponse,
    },
    Synthesizing,
    SynthesisChunk {
        chunk: StreamChunk,
    },
    SynthesisComplete {
        result: SynthesisResult,
    },
    AllComplete,
    Error {
        cause: MirrorError,
    },
}

impl MirrorEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MirrorEvent::AllComplete | MirrorEvent::Error { .. })
    }

    /// Short name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorEvent::Classifying => "classifying",
            MirrorEvent::Classified { .. } => "classified",
            MirrorEvent::StreamChunk { .. } => "stream_chunk",
            MirrorEvent::BackendComplete { .. } => "backend_complete",
            MirrorEvent::Synthesizing => "synthesizing",
            MirrorEvent::SynthesisChunk { .. } => "synthesis_chunk",
            MirrorEvent::SynthesisComplete { .. } => "synthesis_complete",
            MirrorEvent::AllComplete => "all_complete",
            MirrorEvent::Error { .. } => "error",
        }
    }
}
