//! Intent classifier port

use super::brain::{BrainError, ChatOptions};
use async_trait::async_trait;
use mirror_domain::{DomainError, IntentResult};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Classifier brain failed: {0}")]
    Brain(#[from] BrainError),

    #[error("Classifier output unusable: {0}")]
    Parse(#[from] DomainError),
}

impl ClassifierError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClassifierError::Brain(e) if e.is_cancelled())
    }
}

/// Decides whether a question deserves a challenger
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(
        &self,
        input: &str,
        options: &ChatOptions,
    ) -> Result<IntentResult, ClassifierError>;
}
