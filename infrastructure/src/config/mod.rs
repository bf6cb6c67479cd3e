//! Configuration file loading for adversarial-mirror
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `MIRROR_SECTION__KEY`
//! 2. `--config <path>` specified file
//! 3. Project root: `./mirror.toml` or `./.mirror.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/adversarial-mirror/config.toml`
//! 5. Default values

mod file_config;
mod loader;
mod validation;

pub use file_config::{
    DEFAULT_CHALLENGER_BRAIN, DEFAULT_ORIGINAL_BRAIN, FileBrainConfig, FileClassifierConfig,
    FileClassifierMode, FileConfig, FileLayout, FileRetryConfig, FileSessionConfig, FileUiConfig,
    default_brains,
};
pub use loader::{ConfigError, ConfigLoader};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
