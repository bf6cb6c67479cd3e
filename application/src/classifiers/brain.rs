use crate::ports::brain::{BrainAdapter, BrainError, ChatOptions};
use crate::ports::classifier::{ClassifierError, IntentClassifier};
use async_trait::async_trait;
use mirror_domain::{ConversationMessage, IntentResult, MirrorPromptTemplate, parse_intent_response};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Classifier that asks a brain for a JSON verdict.
///
/// Results below the confidence threshold are forced to mirror, so an unsure
/// classifier never suppresses the challenger.
pub struct BrainIntentClassifier {
    brain: Arc<dyn BrainAdapter>,
    threshold: f64,
}

impl BrainIntentClassifier {
    pub fn new(brain: Arc<dyn BrainAdapter>) -> Self {
        Self {
            brain,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[async_trait]
impl IntentClassifier for BrainIntentClassifier {
    async fn classify(
        &self,
        input: &str,
        options: &ChatOptions,
    ) -> Result<IntentResult, ClassifierError> {
        let messages = [ConversationMessage::user(input)];
        let options = ChatOptions {
            temperature: Some(0.0),
            ..options.clone()
        };

        let call = async {
            self.brain
                .chat(&messages, MirrorPromptTemplate::classifier_system(), &options)
                .await?
                .collect_response()
                .await
        };
        let response = match options.cancellation.as_ref() {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(BrainError::Cancelled),
                response = call => response,
            },
            None => call.await,
        }?;

        let mut result = parse_intent_response(&response.text)?;
        debug!(
            "Classifier {} -> {} ({:.2})",
            self.brain.id(),
            result.category,
            result.confidence
        );

        if result.confidence < self.threshold {
            result.should_mirror = true;
            result.reason = format!(
                "{} (below confidence threshold {}).",
                result.reason, self.threshold
            );
        }
        Ok(result)
    }
}
