//! Intent classification result types

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Kind of question the user asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    FactualLookup,
    MathComputation,
    CodeTask,
    Conversational,
    OpinionAdvice,
    Analysis,
    Interpretation,
    Prediction,
}

impl IntentCategory {
    pub const ALL: [IntentCategory; 8] = [
        IntentCategory::FactualLookup,
        IntentCategory::MathComputation,
        IntentCategory::CodeTask,
        IntentCategory::Conversational,
        IntentCategory::OpinionAdvice,
        IntentCategory::Analysis,
        IntentCategory::Interpretation,
        IntentCategory::Prediction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::FactualLookup => "factual_lookup",
            IntentCategory::MathComputation => "math_computation",
            IntentCategory::CodeTask => "code_task",
            IntentCategory::Conversational => "conversational",
            IntentCategory::OpinionAdvice => "opinion_advice",
            IntentCategory::Analysis => "analysis",
            IntentCategory::Interpretation => "interpretation",
            IntentCategory::Prediction => "prediction",
        }
    }

    /// Whether questions of this kind are mirrored by default
    pub fn mirrors_by_default(&self) -> bool {
        matches!(
            self,
            IntentCategory::OpinionAdvice
                | IntentCategory::Analysis
                | IntentCategory::Interpretation
                | IntentCategory::Prediction
        )
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IntentCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::InvalidCategory(s.to_string()))
    }
}

/// Outcome of classifying one question. Created once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub category: IntentCategory,
    pub should_mirror: bool,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub reason: String,
}

impl IntentResult {
    pub fn new(
        category: IntentCategory,
        should_mirror: bool,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            category,
            should_mirror,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }

    /// Result used when the classifier itself failed: mirror, zero confidence.
    pub fn fallback(failure: impl std::fmt::Display) -> Self {
        Self::new(
            IntentCategory::Analysis,
            true,
            0.0,
            format!("Classifier error ({failure}); defaulting to mirror."),
        )
    }

    /// Confidence as a whole percentage, for display
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}
