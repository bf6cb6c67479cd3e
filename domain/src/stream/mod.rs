//! Streaming response domain
//!
//! [`StreamChunk`] is one increment of a brain's streamed answer, and
//! [`StreamAccumulator`] folds a sequence of them into a [`CompletedResponse`].

pub mod accumulator;
pub mod chunk;

pub use accumulator::StreamAccumulator;
pub use chunk::{CompletedResponse, StreamChunk};
