//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid intensity: {0} (expected mild, moderate or aggressive)")]
    InvalidIntensity(String),

    #[error("Unknown persona: {0}")]
    InvalidPersona(String),

    #[error("Unknown intent category: {0}")]
    InvalidCategory(String),

    #[error("Classifier returned non-JSON output")]
    NonJsonIntent,

    #[error("Malformed intent JSON: {0}")]
    MalformedIntent(String),
}
