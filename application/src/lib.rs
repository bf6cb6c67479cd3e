//! Application layer for adversarial-mirror
//!
//! This crate contains the mirror use case, port definitions, the intent
//! classifiers and application configuration.
//! It depends only on the domain layer.

pub mod classifiers;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use classifiers::{BrainIntentClassifier, HeuristicIntentClassifier};
pub use config::{MirrorParams, RetryPolicy};
pub use ports::{
    brain::{
        BrainAdapter, BrainCapabilities, BrainError, BrainProvider, BrainRegistry, ChatOptions,
        ChunkSender, ChunkStream, PingResult,
    },
    classifier::{ClassifierError, IntentClassifier},
    history_store::{HistoryError, HistoryStore},
    mirror_event::{BrainRole, MirrorError, MirrorEvent},
};
pub use use_cases::record_history::HistoryRecorder;
pub use use_cases::run_mirror::{RunMirrorInput, RunMirrorUseCase};
