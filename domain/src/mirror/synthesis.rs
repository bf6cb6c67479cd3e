//! Judge pass output and agreement score extraction

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static AGREEMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)AGREEMENT\s*:\s*(-?\d+)%").expect("agreement pattern is a valid regex")
});

/// Result of the judge pass reconciling original and challenger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub text: String,
    /// Agreement between the two answers, `0..=100`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

/// Extract the `AGREEMENT: <n>%` score from judge output.
///
/// The first match anywhere in the text wins, so stray preamble before the
/// header is tolerated. The value is clamped to `0..=100`. Returns `None` when
/// no header is present or the number does not fit an integer.
///
/// # Examples
///
/// ```
/// use mirror_domain::mirror::extract_agreement_score;
///
/// assert_eq!(extract_agreement_score("AGREEMENT: 73%\nSYNTHESIS"), Some(73));
/// assert_eq!(extract_agreement_score("agreement :  150%"), Some(100));
/// assert_eq!(extract_agreement_score("no header"), None);
/// ```
pub fn extract_agreement_score(text: &str) -> Option<u8> {
    let captures = AGREEMENT_PATTERN.captures(text)?;
    let value: i64 = captures.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0, 100) as u8)
}
