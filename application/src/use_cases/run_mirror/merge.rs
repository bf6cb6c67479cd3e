//! Fair multiplexing of concurrent brain streams

use super::retry::RetryingStream;
use crate::ports::brain::BrainError;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use mirror_domain::{CompletedResponse, StreamAccumulator, StreamChunk};

/// One stream being merged, with its running text
struct Lane {
    index: usize,
    stream: RetryingStream,
    accumulator: StreamAccumulator,
}

type Pull = BoxFuture<'static, (Lane, Option<Result<StreamChunk, BrainError>>)>;

#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    Chunk {
        lane: usize,
        brain_id: String,
        chunk: StreamChunk,
    },
    /// The lane's stream ended; emitted exactly once per lane
    Finished {
        lane: usize,
        brain_id: String,
        response: CompletedResponse,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeFailure {
    pub lane: usize,
    pub brain_id: String,
    pub error: BrainError,
}

/// Merges several [`RetryingStream`]s in real completion order.
///
/// Every open lane has exactly one pull in flight; whichever resolves first is
/// serviced and immediately re-armed. Order within a lane is preserved.
#[derive(Default)]
pub struct StreamMerger {
    pending: FuturesUnordered<Pull>,
    next_index: usize,
}

impl StreamMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream, returning its lane index
    pub fn push(&mut self, stream: RetryingStream) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        self.arm(Lane {
            index,
            stream,
            accumulator: StreamAccumulator::new(),
        });
        index
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn arm(&mut self, mut lane: Lane) {
        self.pending.push(
            async move {
                let item = lane.stream.next().await;
                (lane, item)
            }
            .boxed(),
        );
    }

    /// Next event from any lane; `None` once every lane has finished.
    ///
    /// A failure ends the merge: remaining lanes are dropped.
    pub async fn next(&mut self) -> Option<Result<MergeEvent, MergeFailure>> {
        let (mut lane, item) = self.pending.next().await?;
        let brain_id = lane.stream.brain_id().to_string();

        match item {
            Some(Ok(chunk)) => {
                lane.accumulator.add(&chunk);
                let index = lane.index;
                self.arm(lane);
                Some(Ok(MergeEvent::Chunk {
                    lane: index,
                    brain_id,
                    chunk,
                }))
            }
            Some(Err(error)) => {
                self.pending.clear();
                Some(Err(MergeFailure {
                    lane: lane.index,
                    brain_id,
                    error,
                }))
            }
            None => Some(Ok(MergeEvent::Finished {
                lane: lane.index,
                brain_id,
                response: lane.accumulator.complete(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::brain::{
        BrainAdapter, BrainProvider, ChatOptions, ChunkStream, PingResult,
    };
    use crate::use_cases::run_mirror::fakes::{Script, ScriptedBrain};
    use async_trait::async_trait;
    use mirror_domain::ConversationMessage;
    use std::sync::Arc;
    use std::time::Duration;

    fn lane_for(brain: Arc<dyn BrainAdapter>) -> RetryingStream {
        RetryingStream::new(
            brain,
            vec![ConversationMessage::user("q")],
            "system",
            ChatOptions::default(),
            RetryPolicy::none(),
        )
    }

    /// Emits words with a fixed pause between them
    struct PacedBrain {
        id: &'static str,
        words: &'static [&'static str],
        pause: Duration,
    }

    #[async_trait]
    impl BrainAdapter for PacedBrain {
        fn id(&self) -> &str {
            self.id
        }

        fn provider(&self) -> BrainProvider {
            BrainProvider::Mock
        }

        async fn ping(&self) -> PingResult {
            PingResult::ok(None)
        }

        async fn chat(
            &self,
            _messages: &[ConversationMessage],
            _system_prompt: &str,
            _options: &ChatOptions,
        ) -> Result<ChunkStream, BrainError> {
            let (tx, stream) = ChunkStream::channel();
            let words = self.words;
            let pause = self.pause;
            tokio::spawn(async move {
                for word in words {
                    tokio::time::sleep(pause).await;
                    if tx.send(Ok(StreamChunk::delta(*word))).await.is_err() {
                        return;
                    }
                }
                let _ = tx.send(Ok(StreamChunk::final_chunk("", None, None))).await;
            });
            Ok(stream)
        }
    }

    async fn drain(merger: &mut StreamMerger) -> (Vec<MergeEvent>, Option<MergeFailure>) {
        let mut events = Vec::new();
        while let Some(item) = merger.next().await {
            match item {
                Ok(event) => events.push(event),
                Err(failure) => return (events, Some(failure)),
            }
        }
        (events, None)
    }

    #[tokio::test]
    async fn test_each_lane_finishes_once_with_its_text() {
        let mut merger = StreamMerger::new();
        merger.push(lane_for(Arc::new(ScriptedBrain::answering("a", "alpha beta"))));
        merger.push(lane_for(Arc::new(ScriptedBrain::answering("b", "gamma"))));

        let (events, failure) = drain(&mut merger).await;
        assert!(failure.is_none());
        assert!(merger.is_empty());

        for (lane, expected) in [(0, "alpha beta "), (1, "gamma ")] {
            let deltas: String = events
                .iter()
                .filter_map(|e| match e {
                    MergeEvent::Chunk { lane: l, chunk, .. } if *l == lane => {
                        Some(chunk.delta.as_str())
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(deltas, expected);

            let finished: Vec<_> = events
                .iter()
                .filter_map(|e| match e {
                    MergeEvent::Finished { lane: l, response, .. } if *l == lane => {
                        Some(response.text.clone())
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(finished, vec![expected.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_interleaves_by_arrival() {
        let mut merger = StreamMerger::new();
        merger.push(lane_for(Arc::new(PacedBrain {
            id: "slow",
            words: &["s1", "s2"],
            pause: Duration::from_millis(80),
        })));
        merger.push(lane_for(Arc::new(PacedBrain {
            id: "fast",
            words: &["f1", "f2", "f3"],
            pause: Duration::from_millis(5),
        })));

        let (events, _) = drain(&mut merger).await;
        let first_chunk = events
            .iter()
            .find_map(|e| match e {
                MergeEvent::Chunk { brain_id, .. } => Some(brain_id.as_str()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_chunk, "fast");

        let first_finished = events
            .iter()
            .find_map(|e| match e {
                MergeEvent::Finished { brain_id, .. } => Some(brain_id.as_str()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_finished, "fast");
    }

    #[tokio::test]
    async fn test_failure_ends_merge() {
        let mut merger = StreamMerger::new();
        merger.push(lane_for(Arc::new(ScriptedBrain::new("ok", Script::Hang))));
        merger.push(lane_for(Arc::new(ScriptedBrain::new(
            "broken",
            Script::FailOpen(BrainError::Request("refused".into())),
        ))));

        let (events, failure) = drain(&mut merger).await;
        assert!(events.is_empty());
        let failure = failure.unwrap();
        assert_eq!(failure.brain_id, "broken");
        assert_eq!(failure.lane, 1);
        assert!(merger.is_empty());
        assert!(merger.next().await.is_none());
    }
}
