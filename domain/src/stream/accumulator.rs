//! Running concatenation of one brain call's increments

use super::chunk::{CompletedResponse, StreamChunk};

/// Accumulates the chunks of a single brain call.
///
/// Token counters follow "latest present value wins": a chunk without counts
/// never erases a count recorded earlier.
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    text: String,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chunk: &StreamChunk) {
        self.text.push_str(&chunk.delta);
        if chunk.input_tokens.is_some() {
            self.input_tokens = chunk.input_tokens;
        }
        if chunk.output_tokens.is_some() {
            self.output_tokens = chunk.output_tokens;
        }
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Snapshot of the response; may be called at any time
    pub fn complete(&self) -> CompletedResponse {
        CompletedResponse {
            text: self.text.clone(),
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_deltas_in_order() {
        let mut acc = StreamAccumulator::new();
        acc.add(&StreamChunk::delta("This "));
        acc.add(&StreamChunk::delta("is "));
        acc.add(&StreamChunk::final_chunk("it.", None, None));
        assert_eq!(acc.complete().text, "This is it.");
    }

    #[test]
    fn test_missing_counts_do_not_erase() {
        let mut acc = StreamAccumulator::new();
        acc.add(&StreamChunk {
            delta: "a".into(),
            is_final: false,
            input_tokens: Some(10),
            output_tokens: Some(1),
        });
        acc.add(&StreamChunk::delta("b"));
        acc.add(&StreamChunk {
            delta: String::new(),
            is_final: true,
            input_tokens: None,
            output_tokens: Some(7),
        });

        let response = acc.complete();
        assert_eq!(response.input_tokens, Some(10));
        assert_eq!(response.output_tokens, Some(7));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut acc = StreamAccumulator::new();
        acc.add(&StreamChunk::delta("x"));
        assert_eq!(acc.complete(), acc.complete());
        assert_eq!(acc.text(), "x");
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = StreamAccumulator::new();
        assert_eq!(acc.complete(), CompletedResponse::default());
    }
}
