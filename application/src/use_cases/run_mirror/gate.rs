//! Single vs. dual routing

use crate::ports::brain::ChatOptions;
use crate::ports::classifier::IntentClassifier;
use crate::ports::mirror_event::MirrorError;
use mirror_domain::IntentResult;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Original brain only
    Direct,
    /// Original and challenger side by side
    Mirror,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub route: Route,
    /// Present only when the classifier was consulted
    pub intent: Option<IntentResult>,
}

/// Decides, once per run, whether the challenger takes part.
pub struct ClassificationGate<'a> {
    classifier: &'a dyn IntentClassifier,
    auto_classify: bool,
    has_challenger: bool,
}

impl<'a> ClassificationGate<'a> {
    pub fn new(classifier: &'a dyn IntentClassifier, auto_classify: bool, has_challenger: bool) -> Self {
        Self {
            classifier,
            auto_classify,
            has_challenger,
        }
    }

    /// Whether [`decide`](Self::decide) will consult the classifier
    pub fn will_classify(&self) -> bool {
        self.auto_classify && self.has_challenger
    }

    pub async fn decide(
        &self,
        input: &str,
        options: &ChatOptions,
    ) -> Result<GateDecision, MirrorError> {
        if !self.will_classify() {
            let route = if self.has_challenger {
                Route::Mirror
            } else {
                Route::Direct
            };
            debug!("Classification skipped, route {:?}", route);
            return Ok(GateDecision {
                route,
                intent: None,
            });
        }

        let intent = match self.classifier.classify(input, options).await {
            Ok(intent) => intent,
            Err(e) if e.is_cancelled() => return Err(MirrorError::Cancelled),
            Err(e) => {
                warn!("Intent classification failed: {}", e);
                IntentResult::fallback(e)
            }
        };

        let route = if intent.should_mirror {
            Route::Mirror
        } else {
            Route::Direct
        };
        debug!("Classified as {} -> {:?}", intent.category, route);
        Ok(GateDecision {
            route,
            intent: Some(intent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::brain::BrainError;
    use crate::ports::classifier::ClassifierError;
    use crate::use_cases::run_mirror::fakes::FixedClassifier;
    use mirror_domain::{DomainError, IntentCategory};

    fn factual() -> IntentResult {
        IntentResult::new(IntentCategory::FactualLookup, false, 0.95, "Lookup.")
    }

    #[tokio::test]
    async fn test_disabled_skips_classifier() {
        let classifier = FixedClassifier::new(Ok(factual()));
        let decision = ClassificationGate::new(&classifier, false, true)
            .decide("q", &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(decision.route, Route::Mirror);
        assert!(decision.intent.is_none());
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_challenger_is_direct() {
        let classifier = FixedClassifier::new(Ok(factual()));
        let decision = ClassificationGate::new(&classifier, true, false)
            .decide("q", &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(decision.route, Route::Direct);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_follows_classifier_verdict() {
        let classifier = FixedClassifier::new(Ok(factual()));
        let decision = ClassificationGate::new(&classifier, true, true)
            .decide("What is the capital of France?", &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(decision.route, Route::Direct);
        assert_eq!(decision.intent, Some(factual()));
    }

    #[tokio::test]
    async fn test_failure_biases_to_mirror() {
        let classifier =
            FixedClassifier::new(Err(ClassifierError::Parse(DomainError::NonJsonIntent)));
        let decision = ClassificationGate::new(&classifier, true, true)
            .decide("q", &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(decision.route, Route::Mirror);

        let intent = decision.intent.unwrap();
        assert_eq!(intent.category, IntentCategory::Analysis);
        assert_eq!(intent.confidence, 0.0);
        assert!(intent.reason.contains("non-JSON"));
    }

    #[tokio::test]
    async fn test_cancelled_classifier_is_cancellation() {
        let classifier = FixedClassifier::new(Err(ClassifierError::Brain(BrainError::Cancelled)));
        let err = ClassificationGate::new(&classifier, true, true)
            .decide("q", &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
