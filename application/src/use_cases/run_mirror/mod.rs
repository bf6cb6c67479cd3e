//! Run Mirror use case
//!
//! Orchestrates one mirror run: classify the question, stream the original
//! (and, when routed to mirror, the challenger) concurrently, optionally hand
//! both answers to a judge, and report everything as [`MirrorEvent`]s.

mod gate;
mod judge;
mod merge;
mod retry;

#[cfg(test)]
pub(crate) mod fakes;

pub use gate::{ClassificationGate, GateDecision, Route};
pub use judge::JudgePass;
pub use merge::{MergeEvent, MergeFailure, StreamMerger};
pub use retry::RetryingStream;

use crate::config::MirrorParams;
use crate::ports::brain::{BrainAdapter, ChatOptions};
use crate::ports::classifier::IntentClassifier;
use crate::ports::mirror_event::{BrainRole, MirrorError, MirrorEvent};
use mirror_domain::{
    CompletedResponse, ConversationMessage, MirrorPromptTemplate, StreamAccumulator,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the event channel created by [`RunMirrorUseCase::spawn`]
pub const EVENT_BUFFER: usize = 128;

/// Input for the RunMirror use case
#[derive(Debug, Clone, Default)]
pub struct RunMirrorInput {
    /// The new user question
    pub question: String,
    /// Prior turns, oldest first; never modified by the run
    pub history: Vec<ConversationMessage>,
    /// Passed unchanged to every brain call of the run
    pub options: ChatOptions,
}

impl RunMirrorInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

/// Sending half of a run's event channel
struct EventSink {
    tx: mpsc::Sender<MirrorEvent>,
}

impl EventSink {
    async fn emit(&self, event: MirrorEvent) -> Result<(), MirrorError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| MirrorError::ConsumerGone)
    }
}

/// Use case for running a mirror round
pub struct RunMirrorUseCase {
    original: Arc<dyn BrainAdapter>,
    challenger: Option<Arc<dyn BrainAdapter>>,
    judge: Option<JudgePass>,
    classifier: Arc<dyn IntentClassifier>,
    params: MirrorParams,
}

impl RunMirrorUseCase {
    pub fn new(original: Arc<dyn BrainAdapter>, classifier: Arc<dyn IntentClassifier>) -> Self {
        Self {
            original,
            challenger: None,
            judge: None,
            classifier,
            params: MirrorParams::default(),
        }
    }

    pub fn with_challenger(mut self, challenger: Option<Arc<dyn BrainAdapter>>) -> Self {
        self.challenger = challenger;
        self
    }

    pub fn with_judge(mut self, judge: Option<Arc<dyn BrainAdapter>>) -> Self {
        self.judge = judge.map(JudgePass::new);
        self
    }

    pub fn with_params(mut self, params: MirrorParams) -> Self {
        self.params = params;
        self
    }

    pub fn original_id(&self) -> &str {
        self.original.id()
    }

    pub fn challenger_id(&self) -> Option<&str> {
        self.challenger.as_ref().map(|c| c.id())
    }

    pub fn judge_id(&self) -> Option<&str> {
        self.judge.as_ref().map(JudgePass::brain_id)
    }

    pub fn params(&self) -> &MirrorParams {
        &self.params
    }

    /// Run to completion, sending every event into `events`.
    ///
    /// Exactly one `AllComplete` or `Error` ends the run. If the receiver is
    /// dropped the run stops quietly at the next send.
    pub async fn execute(&self, input: RunMirrorInput, events: mpsc::Sender<MirrorEvent>) {
        let sink = EventSink { tx: events };
        match self.run(input, &sink).await {
            Ok(()) => {
                debug!("Mirror run complete");
                let _ = sink.emit(MirrorEvent::AllComplete).await;
            }
            Err(MirrorError::ConsumerGone) => {
                debug!("Event consumer dropped; stopping mirror run");
            }
            Err(cause) => {
                if cause.is_cancelled() {
                    info!("Mirror run cancelled");
                } else {
                    warn!("Mirror run failed: {}", cause);
                }
                let _ = sink.emit(MirrorEvent::Error { cause }).await;
            }
        }
    }

    /// Run on a spawned task and return the event receiver
    pub fn spawn(self: Arc<Self>, input: RunMirrorInput) -> mpsc::Receiver<MirrorEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move { self.execute(input, tx).await });
        rx
    }

    /// Run and gather every event in order
    pub async fn collect(&self, input: RunMirrorInput) -> Vec<MirrorEvent> {
        let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
        let gather = async move {
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
            events
        };
        let ((), events) = tokio::join!(self.execute(input, tx), gather);
        events
    }

    async fn run(&self, mut input: RunMirrorInput, sink: &EventSink) -> Result<(), MirrorError> {
        let token = input
            .options
            .cancellation
            .get_or_insert_with(CancellationToken::new)
            .clone();
        if token.is_cancelled() {
            return Err(MirrorError::Cancelled);
        }

        info!(
            "Starting mirror run: original={}, challenger={}, judge={}",
            self.original.id(),
            self.challenger_id().unwrap_or("-"),
            self.judge_id().unwrap_or("-")
        );

        // Phase 1: Classification
        let gate = ClassificationGate::new(
            self.classifier.as_ref(),
            self.params.auto_classify,
            self.challenger.is_some(),
        );
        if gate.will_classify() {
            sink.emit(MirrorEvent::Classifying).await?;
        }
        let decision = gate.decide(&input.question, &input.options).await?;
        if let Some(result) = decision.intent {
            sink.emit(MirrorEvent::Classified { result }).await?;
        }

        let challenger = match decision.route {
            Route::Mirror => self.challenger.as_ref(),
            Route::Direct => None,
        };

        // Phase 2: Original (and challenger) streams
        let (original, challenger) = self.phase_primaries(&input, challenger, sink).await?;

        // Phase 3: Judge (optional)
        match (&self.judge, challenger) {
            (Some(judge), Some(challenger)) => {
                self.phase_judge(judge, &input, &original, &challenger, sink)
                    .await
            }
            _ => {
                debug!("Skipping judge phase");
                Ok(())
            }
        }
    }

    async fn phase_primaries(
        &self,
        input: &RunMirrorInput,
        challenger: Option<&Arc<dyn BrainAdapter>>,
        sink: &EventSink,
    ) -> Result<(CompletedResponse, Option<CompletedResponse>), MirrorError> {
        let question = ConversationMessage::user(&input.question);
        let mut merger = StreamMerger::new();

        let mut messages = input.history.clone();
        messages.push(question.clone());
        let original_lane = merger.push(RetryingStream::new(
            Arc::clone(&self.original),
            messages,
            MirrorPromptTemplate::original_system(),
            input.options.clone(),
            self.params.retry,
        ));

        if let Some(challenger) = challenger {
            let mut messages = MirrorPromptTemplate::challenger_history(&input.history);
            messages.push(question);
            merger.push(RetryingStream::new(
                Arc::clone(challenger),
                messages,
                self.params.challenger_prompt(),
                input.options.clone(),
                self.params.retry,
            ));
            debug!("Dual run: {} vs {}", self.original.id(), challenger.id());
        } else {
            debug!("Single run: {}", self.original.id());
        }

        let role_of = |lane: usize| {
            if lane == original_lane {
                BrainRole::Original
            } else {
                BrainRole::Challenger
            }
        };
        let mut original = CompletedResponse::default();
        let mut challenger_response = None;

        while let Some(item) = merger.next().await {
            match item {
                Ok(MergeEvent::Chunk {
                    lane,
                    brain_id,
                    chunk,
                }) => {
                    sink.emit(MirrorEvent::StreamChunk {
                        role: role_of(lane),
                        brain_id,
                        chunk,
                    })
                    .await?;
                }
                Ok(MergeEvent::Finished {
                    lane,
                    brain_id,
                    response,
                }) => {
                    info!("Brain {} finished ({} chars)", brain_id, response.text.len());
                    let role = role_of(lane);
                    match role {
                        BrainRole::Original => original = response.clone(),
                        BrainRole::Challenger => challenger_response = Some(response.clone()),
                    }
                    sink.emit(MirrorEvent::BackendComplete {
                        role,
                        brain_id,
                        response,
                    })
                    .await?;
                }
                Err(failure) => {
                    return Err(MirrorError::backend(failure.brain_id, failure.error));
                }
            }
        }

        Ok((original, challenger_response))
    }

    async fn phase_judge(
        &self,
        judge: &JudgePass,
        input: &RunMirrorInput,
        original: &CompletedResponse,
        challenger: &CompletedResponse,
        sink: &EventSink,
    ) -> Result<(), MirrorError> {
        info!("Judging with {}", judge.brain_id());
        sink.emit(MirrorEvent::Synthesizing).await?;

        let mut stream = judge.stream(
            &input.question,
            original,
            challenger,
            &input.options,
            self.params.retry,
        );
        let mut accumulator = StreamAccumulator::new();

        while let Some(item) = stream.next().await {
            let chunk = item.map_err(|e| MirrorError::judge(judge.brain_id(), e))?;
            accumulator.add(&chunk);
            sink.emit(MirrorEvent::SynthesisChunk { chunk }).await?;
        }

        let result = JudgePass::finish(accumulator.complete());
        sink.emit(MirrorEvent::SynthesisComplete { result }).await
    }
}
