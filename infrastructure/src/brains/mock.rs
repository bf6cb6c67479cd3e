//! Offline brain that streams a canned answer

use async_trait::async_trait;
use mirror_application::{
    BrainAdapter, BrainCapabilities, BrainError, BrainProvider, ChatOptions, ChunkStream,
    PingResult,
};
use mirror_domain::{ConversationMessage, StreamChunk};
use std::time::Duration;

/// Streams `"{word} "` per word of its response, then an empty final chunk.
pub struct MockBrain {
    id: String,
    response: String,
    chunk_delay: Option<Duration>,
}

impl MockBrain {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            response: format!("Mock response from {id}."),
            id,
            chunk_delay: None,
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Pause between chunks, to make streaming visible
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }
}

#[async_trait]
impl BrainAdapter for MockBrain {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider(&self) -> BrainProvider {
        BrainProvider::Mock
    }

    fn capabilities(&self) -> BrainCapabilities {
        BrainCapabilities {
            streaming: true,
            max_context_tokens: None,
        }
    }

    async fn ping(&self) -> PingResult {
        PingResult::ok(Some(1))
    }

    async fn chat(
        &self,
        _messages: &[ConversationMessage],
        _system_prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChunkStream, BrainError> {
        let (tx, stream) = ChunkStream::channel();
        let words: Vec<String> = self.response.split(' ').map(|w| format!("{w} ")).collect();
        let delay = self.chunk_delay;
        let token = options.cancellation.clone().unwrap_or_default();

        tokio::spawn(async move {
            for word in words {
                if let Some(delay) = delay {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            let _ = tx.send(Err(BrainError::Cancelled)).await;
                            return;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if tx.send(Ok(StreamChunk::delta(word))).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Ok(StreamChunk::final_chunk("", None, None))).await;
        });

        Ok(stream)
    }
}
