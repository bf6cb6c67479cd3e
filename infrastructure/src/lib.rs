//! Infrastructure layer for adversarial-mirror
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP brain adapters, configuration file
//! loading and the JSON history store.

pub mod brains;
pub mod config;
pub mod history;

// Re-export commonly used types
pub use brains::{
    AnthropicBrain, BrainFactory, FactoryError, GeminiBrain, MOCK_ENV_VARS, MockBrain,
    OpenAiBrain, build_classifier, mock_brains_from_env,
};
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, FileBrainConfig,
    FileClassifierConfig, FileClassifierMode, FileConfig, FileLayout, FileRetryConfig,
    FileSessionConfig, FileUiConfig, Severity, default_brains,
};
pub use history::{JsonHistoryStore, MAX_ENTRIES};
