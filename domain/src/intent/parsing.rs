//! Parsing of LLM classifier output.
//!
//! The classifier brain is asked for strict JSON, but models wrap it in prose
//! or code fences often enough that we take the outermost `{ ... }` span and
//! normalize every field leniently.

use super::entities::{IntentCategory, IntentResult};
use crate::core::error::DomainError;
use serde_json::Value;

/// Parse a classifier response into an [`IntentResult`].
///
/// - unknown or missing `category` becomes `analysis`
/// - `confidence` is clamped to `[0, 1]` (missing → 0)
/// - missing `shouldMirror` is derived from the category
/// - missing or empty `reason` becomes `"No reason provided."`
///
/// Both `shouldMirror` and `should_mirror` keys are accepted.
///
/// # Examples
///
/// ```
/// use mirror_domain::intent::{parse_intent_response, IntentCategory};
///
/// let r = parse_intent_response(r#"{"category":"code_task","confidence":0.9}"#).unwrap();
/// assert_eq!(r.category, IntentCategory::CodeTask);
/// assert!(!r.should_mirror);
/// ```
pub fn parse_intent_response(text: &str) -> Result<IntentResult, DomainError> {
    let trimmed = text.trim();
    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        return Err(DomainError::NonJsonIntent);
    };
    if end <= start {
        return Err(DomainError::NonJsonIntent);
    }

    let parsed: Value = serde_json::from_str(&trimmed[start..=end])
        .map_err(|e| DomainError::MalformedIntent(e.to_string()))?;

    let category = parsed
        .get("category")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(IntentCategory::Analysis);

    let confidence = parsed
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let should_mirror = parsed
        .get("shouldMirror")
        .or_else(|| parsed.get("should_mirror"))
        .and_then(Value::as_bool)
        .unwrap_or_else(|| category.mirrors_by_default());

    let reason = parsed
        .get("reason")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("No reason provided.");

    Ok(IntentResult::new(category, should_mirror, confidence, reason))
}
