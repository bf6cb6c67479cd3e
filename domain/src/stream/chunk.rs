//! Stream increments and completed responses

use serde::{Deserialize, Serialize};

/// One increment of a streamed brain response.
///
/// Concatenating every `delta` of a call, in order, yields the call's full text.
/// At most one chunk per call has `is_final` set, and it is always the last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub delta: String,
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl StreamChunk {
    /// A non-final text increment
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            delta: text.into(),
            ..Default::default()
        }
    }

    /// The terminating increment, optionally carrying usage counters
    pub fn final_chunk(
        text: impl Into<String>,
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    ) -> Self {
        Self {
            delta: text.into(),
            is_final: true,
            input_tokens,
            output_tokens,
        }
    }
}

/// Terminal value of a brain call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl CompletedResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_not_final() {
        let chunk = StreamChunk::delta("hello ");
        assert!(!chunk.is_final);
        assert_eq!(chunk.input_tokens, None);
    }

    #[test]
    fn test_final_chunk_carries_usage() {
        let chunk = StreamChunk::final_chunk("", Some(12), Some(34));
        assert!(chunk.is_final);
        assert_eq!(chunk.output_tokens, Some(34));
    }

    #[test]
    fn test_usage_omitted_from_json_when_absent() {
        let json = serde_json::to_value(StreamChunk::delta("x")).unwrap();
        assert!(json.get("input_tokens").is_none());
    }
}
