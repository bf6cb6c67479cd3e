//! Subcommand handlers

pub mod brains;
pub mod config;
pub mod history;
pub mod run;
