//! Interactive chat module
//!
//! Provides a line-editor based interactive chat interface for mirror runs.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
