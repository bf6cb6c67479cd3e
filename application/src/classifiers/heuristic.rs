use crate::ports::brain::ChatOptions;
use crate::ports::classifier::{ClassifierError, IntentClassifier};
use async_trait::async_trait;
use mirror_domain::{IntentResult, classify_heuristic};

/// Keyword classifier that never calls a model
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicIntentClassifier;

#[async_trait]
impl IntentClassifier for HeuristicIntentClassifier {
    async fn classify(
        &self,
        input: &str,
        _options: &ChatOptions,
    ) -> Result<IntentResult, ClassifierError> {
        Ok(classify_heuristic(input))
    }
}
