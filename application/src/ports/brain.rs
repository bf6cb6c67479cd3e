//! Brain port
//!
//! Defines the interface for talking to one LLM backend ("brain"). Adapters
//! live in the infrastructure layer; the mirror use case only sees this trait.

use async_trait::async_trait;
use mirror_domain::{CompletedResponse, ConversationMessage, StreamAccumulator, StreamChunk};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the channel between an adapter task and its [`ChunkStream`]
pub const CHUNK_BUFFER: usize = 64;

/// Errors that can occur while talking to a brain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrainError {
    #[error("Missing API key. Set {0} or run with --mock.")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown brain: {0}")]
    UnknownBrain(String),

    #[error("Brain already registered: {0}")]
    DuplicateBrain(String),

    #[error("Cancelled")]
    Cancelled,
}

impl BrainError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BrainError::Cancelled)
    }
}

/// Backend family of a brain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainProvider {
    Anthropic,
    OpenAi,
    Gemini,
    Mock,
}

impl BrainProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrainProvider::Anthropic => "anthropic",
            BrainProvider::OpenAi => "openai",
            BrainProvider::Gemini => "gemini",
            BrainProvider::Mock => "mock",
        }
    }

    /// Conventional API key variable for this provider
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            BrainProvider::Anthropic => "ANTHROPIC_API_KEY",
            BrainProvider::OpenAi => "OPENAI_API_KEY",
            BrainProvider::Gemini => "GOOGLE_API_KEY",
            BrainProvider::Mock => "MOCK_API_KEY",
        }
    }
}

impl std::fmt::Display for BrainProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BrainProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(BrainProvider::Anthropic),
            "openai" => Ok(BrainProvider::OpenAi),
            "gemini" => Ok(BrainProvider::Gemini),
            "mock" => Ok(BrainProvider::Mock),
            other => Err(format!("Unsupported provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainCapabilities {
    /// Whether the adapter emits incremental deltas (otherwise one final chunk)
    pub streaming: bool,
    pub max_context_tokens: Option<u64>,
}

impl Default for BrainCapabilities {
    fn default() -> Self {
        Self {
            streaming: true,
            max_context_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingResult {
    pub ok: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl PingResult {
    pub fn ok(latency_ms: Option<u64>) -> Self {
        Self {
            ok: true,
            latency_ms,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// Per-call options, passed through unchanged to every brain in a run
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub cancellation: Option<CancellationToken>,
}

impl ChatOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

pub type ChunkSender = mpsc::Sender<Result<StreamChunk, BrainError>>;

/// Handle for receiving the chunks of one brain call.
///
/// Wraps an `mpsc::Receiver`; the adapter feeds it from a spawned task and
/// closes it once the final chunk (or an error) has been sent.
pub struct ChunkStream {
    receiver: mpsc::Receiver<Result<StreamChunk, BrainError>>,
}

impl ChunkStream {
    pub fn new(receiver: mpsc::Receiver<Result<StreamChunk, BrainError>>) -> Self {
        Self { receiver }
    }

    /// Create a connected sender / stream pair
    pub fn channel() -> (ChunkSender, Self) {
        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        (tx, Self::new(rx))
    }

    /// A stream that yields the given items and then ends
    pub fn from_items(items: Vec<Result<StreamChunk, BrainError>>) -> Self {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            // Capacity covers every item, so try_send cannot fail here
            let _ = tx.try_send(item);
        }
        Self::new(rx)
    }

    pub async fn next(&mut self) -> Option<Result<StreamChunk, BrainError>> {
        self.receiver.recv().await
    }

    /// Drain the stream into a single response.
    ///
    /// A stream that closes before its final chunk is an error, never a
    /// short answer.
    pub async fn collect_response(mut self) -> Result<CompletedResponse, BrainError> {
        let mut accumulator = StreamAccumulator::new();
        while let Some(item) = self.next().await {
            let chunk = item?;
            accumulator.add(&chunk);
            if chunk.is_final {
                return Ok(accumulator.complete());
            }
        }
        Err(BrainError::Stream(
            "stream closed before the final chunk".to_string(),
        ))
    }
}

/// One LLM backend
///
/// `chat` starts a call and returns as soon as the stream is open. Errors may
/// surface either from `chat` itself (nothing sent yet) or as an `Err` item in
/// the stream.
#[async_trait]
pub trait BrainAdapter: Send + Sync {
    /// Identifier used in events and history
    fn id(&self) -> &str;

    fn provider(&self) -> BrainProvider;

    fn capabilities(&self) -> BrainCapabilities {
        BrainCapabilities::default()
    }

    /// Cheap reachability check
    async fn ping(&self) -> PingResult;

    async fn chat(
        &self,
        messages: &[ConversationMessage],
        system_prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChunkStream, BrainError>;

    /// Rough size of a conversation (one unit per character)
    fn estimate_tokens(&self, messages: &[ConversationMessage]) -> usize {
        messages.iter().map(|m| m.content.len()).sum()
    }
}

/// Brains available to a process, keyed by id
#[derive(Default)]
pub struct BrainRegistry {
    brains: Vec<Arc<dyn BrainAdapter>>,
}

impl BrainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, brain: Arc<dyn BrainAdapter>) -> Result<(), BrainError> {
        if self.brains.iter().any(|b| b.id() == brain.id()) {
            return Err(BrainError::DuplicateBrain(brain.id().to_string()));
        }
        self.brains.push(brain);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn BrainAdapter>, BrainError> {
        self.brains
            .iter()
            .find(|b| b.id() == id)
            .cloned()
            .ok_or_else(|| BrainError::UnknownBrain(id.to_string()))
    }

    pub fn list(&self) -> &[Arc<dyn BrainAdapter>] {
        &self.brains
    }
}
