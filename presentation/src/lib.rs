//! Presentation layer for adversarial-mirror
//!
//! This crate contains CLI definitions, console formatting, the live event
//! renderer, progress spinners and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::{
    AddBrainArgs, BrainsCommand, Cli, Command, ConfigCommand, GlobalArgs, HistoryCommand,
    IntensityArg,
};
pub use config::{Layout, OutputConfig};
pub use output::console::ConsoleFormatter;
pub use output::render::{EventRenderer, RunLabels, RunOutcome, render_run};
pub use progress::reporter::ProgressReporter;
