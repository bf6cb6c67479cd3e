//! Rule-based intent classification

use super::entities::{IntentCategory, IntentResult};

const FACTUAL_PREFIXES: [&str; 4] = ["who ", "what ", "when ", "where "];

/// Classify a question without calling any model.
///
/// Questions opening with who/what/when/where are treated as factual lookups;
/// everything else is assumed to be open-ended analysis.
pub fn classify_heuristic(input: &str) -> IntentResult {
    let normalized = input.trim().to_lowercase();
    let looks_factual = FACTUAL_PREFIXES.iter().any(|p| normalized.starts_with(p));

    if looks_factual {
        IntentResult::new(
            IntentCategory::FactualLookup,
            false,
            0.55,
            "Heuristic: question starts with who/what/when/where.",
        )
    } else {
        IntentResult::new(
            IntentCategory::Analysis,
            true,
            0.45,
            "Heuristic: default to analysis for open-ended prompts.",
        )
    }
}
