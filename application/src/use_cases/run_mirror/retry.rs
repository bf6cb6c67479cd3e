//! Retrying driver for a single brain call

use crate::config::RetryPolicy;
use crate::ports::brain::{BrainAdapter, BrainError, ChatOptions, ChunkStream};
use mirror_domain::{ConversationMessage, StreamChunk};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drives one logical brain call, re-issuing it when it fails before
/// producing any output.
///
/// Once a chunk has been yielded the call is never replayed: a later error is
/// surfaced as-is and the delivered output stands. Cancellation is surfaced
/// immediately and never consumes retry budget.
pub struct RetryingStream {
    brain: Arc<dyn BrainAdapter>,
    messages: Vec<ConversationMessage>,
    system_prompt: String,
    options: ChatOptions,
    policy: RetryPolicy,
    attempt: u32,
    current: Option<ChunkStream>,
    yielded: usize,
    done: bool,
}

impl RetryingStream {
    pub fn new(
        brain: Arc<dyn BrainAdapter>,
        messages: Vec<ConversationMessage>,
        system_prompt: impl Into<String>,
        options: ChatOptions,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            brain,
            messages,
            system_prompt: system_prompt.into(),
            options,
            policy,
            attempt: 0,
            current: None,
            yielded: 0,
            done: false,
        }
    }

    pub fn brain_id(&self) -> &str {
        self.brain.id()
    }

    /// Next chunk of the call, `None` once it has finished.
    ///
    /// An `Err` item is always the last item.
    pub async fn next(&mut self) -> Option<Result<StreamChunk, BrainError>> {
        if self.done {
            return None;
        }
        let token = self.options.cancellation.clone();

        loop {
            if self.current.is_none() {
                match self.open(token.as_ref()).await {
                    Ok(stream) => self.current = Some(stream),
                    Err(error) => {
                        if let Some(error) = self.recover(error, token.as_ref()).await {
                            return self.fail(error);
                        }
                        continue;
                    }
                }
            }
            let Some(stream) = self.current.as_mut() else {
                continue;
            };

            match Self::pull(stream, token.as_ref()).await {
                Some(Ok(chunk)) => {
                    self.yielded += 1;
                    if chunk.is_final {
                        self.finish();
                    }
                    return Some(Ok(chunk));
                }
                Some(Err(error)) => {
                    self.current = None;
                    if let Some(error) = self.recover(error, token.as_ref()).await {
                        return self.fail(error);
                    }
                }
                None => {
                    self.finish();
                    return None;
                }
            }
        }
    }

    async fn open(&self, token: Option<&CancellationToken>) -> Result<ChunkStream, BrainError> {
        let call = self
            .brain
            .chat(&self.messages, &self.system_prompt, &self.options);
        match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(BrainError::Cancelled),
                result = call => result,
            },
            None => call.await,
        }
    }

    async fn pull(
        stream: &mut ChunkStream,
        token: Option<&CancellationToken>,
    ) -> Option<Result<StreamChunk, BrainError>> {
        match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Some(Err(BrainError::Cancelled)),
                item = stream.next() => item,
            },
            None => stream.next().await,
        }
    }

    /// Decide what to do with a failure: `Some(error)` to surface it,
    /// `None` once the backoff has elapsed and the call should be re-issued.
    async fn recover(
        &mut self,
        error: BrainError,
        token: Option<&CancellationToken>,
    ) -> Option<BrainError> {
        if error.is_cancelled() || self.yielded > 0 || self.attempt >= self.policy.max_retries {
            return Some(error);
        }

        self.attempt += 1;
        let delay = self.policy.delay_for(self.attempt);
        debug!(
            "Brain {} failed ({}); retry {}/{} in {:?}",
            self.brain.id(),
            error,
            self.attempt,
            self.policy.max_retries,
            delay
        );

        match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Some(BrainError::Cancelled),
                _ = tokio::time::sleep(delay) => None,
            },
            None => {
                tokio::time::sleep(delay).await;
                None
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        self.current = None;
    }

    fn fail(&mut self, error: BrainError) -> Option<Result<StreamChunk, BrainError>> {
        self.finish();
        Some(Err(error))
    }
}
