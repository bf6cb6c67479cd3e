//! Scripted brains and classifiers for use case tests

use crate::ports::brain::{
    BrainAdapter, BrainError, BrainProvider, ChatOptions, ChunkStream, PingResult,
};
use crate::ports::classifier::{ClassifierError, IntentClassifier};
use async_trait::async_trait;
use mirror_domain::{ConversationMessage, IntentResult, StreamChunk};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Stream `"{word} "` per word, then an empty final chunk
    Words(String),
    /// `chat` itself fails
    FailOpen(BrainError),
    /// Stream the words, then fail instead of finishing
    FailMidway(String, BrainError),
    /// Open a stream that never yields
    Hang,
    /// Stream the words, then stay open without finishing
    Stall(String),
}

fn word_chunks(text: &str) -> Vec<Result<StreamChunk, BrainError>> {
    text.split_whitespace()
        .map(|w| Ok(StreamChunk::delta(format!("{w} "))))
        .collect()
}

pub(crate) struct ScriptedBrain {
    id: String,
    scripts: Mutex<VecDeque<Script>>,
    fallback: Script,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ConversationMessage>>,
    last_system: Mutex<String>,
}

impl ScriptedBrain {
    /// Brain that runs `fallback` on every call
    pub(crate) fn new(id: &str, fallback: Script) -> Self {
        Self::scripted(id, Vec::new(), fallback)
    }

    /// Brain that runs `scripts` in order, then `fallback` forever
    pub(crate) fn scripted(id: &str, scripts: Vec<Script>, fallback: Script) -> Self {
        Self {
            id: id.to_string(),
            scripts: Mutex::new(scripts.into()),
            fallback,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
            last_system: Mutex::new(String::new()),
        }
    }

    pub(crate) fn answering(id: &str, text: &str) -> Self {
        Self::new(id, Script::Words(text.to_string()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_messages(&self) -> Vec<ConversationMessage> {
        self.last_messages.lock().unwrap().clone()
    }

    pub(crate) fn last_system(&self) -> String {
        self.last_system.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrainAdapter for ScriptedBrain {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider(&self) -> BrainProvider {
        BrainProvider::Mock
    }

    async fn ping(&self) -> PingResult {
        PingResult::ok(Some(0))
    }

    async fn chat(
        &self,
        messages: &[ConversationMessage],
        system_prompt: &str,
        _options: &ChatOptions,
    ) -> Result<ChunkStream, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        *self.last_system.lock().unwrap() = system_prompt.to_string();

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match script {
            Script::Words(text) => {
                let mut items = word_chunks(&text);
                items.push(Ok(StreamChunk::final_chunk("", Some(5), Some(7))));
                Ok(ChunkStream::from_items(items))
            }
            Script::FailOpen(error) => Err(error),
            Script::FailMidway(text, error) => {
                let mut items = word_chunks(&text);
                items.push(Err(error));
                Ok(ChunkStream::from_items(items))
            }
            Script::Hang => {
                let (tx, stream) = ChunkStream::channel();
                tokio::spawn(async move { tx.closed().await });
                Ok(stream)
            }
            Script::Stall(text) => {
                let (tx, stream) = ChunkStream::channel();
                tokio::spawn(async move {
                    for item in word_chunks(&text) {
                        if tx.send(item).await.is_err() {
                            return;
                        }
                    }
                    tx.closed().await
                });
                Ok(stream)
            }
        }
    }
}

/// Classifier returning a fixed verdict and counting calls
pub(crate) struct FixedClassifier {
    result: Result<IntentResult, ClassifierError>,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub(crate) fn new(result: Result<IntentResult, ClassifierError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for FixedClassifier {
    async fn classify(
        &self,
        _input: &str,
        _options: &ChatOptions,
    ) -> Result<IntentResult, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
