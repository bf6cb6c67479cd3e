//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod brains;
mod classifier;
mod retry;
mod session;
mod ui;

pub use brains::{FileBrainConfig, default_brains};
pub use classifier::{FileClassifierConfig, FileClassifierMode};
pub use retry::FileRetryConfig;
pub use session::{DEFAULT_CHALLENGER_BRAIN, DEFAULT_ORIGINAL_BRAIN, FileSessionConfig};
pub use ui::{FileLayout, FileUiConfig};

use super::validation::{ConfigIssue, ConfigIssueCode, Severity};
use mirror_application::MirrorParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Brain selection and run behavior
    pub session: FileSessionConfig,
    /// Terminal output settings
    pub ui: FileUiConfig,
    /// Available brains
    pub brains: Vec<FileBrainConfig>,
    /// Intent classifier settings
    pub classifier: FileClassifierConfig,
    /// Retry settings for every brain call
    pub retry: FileRetryConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            session: FileSessionConfig::default(),
            ui: FileUiConfig::default(),
            brains: default_brains(),
            classifier: FileClassifierConfig::default(),
            retry: FileRetryConfig::default(),
        }
    }
}

impl FileConfig {
    pub fn brain(&self, id: &str) -> Option<&FileBrainConfig> {
        self.brains.iter().find(|b| b.id == id)
    }

    /// Run parameters derived from `[session]` and `[retry]`
    pub fn mirror_params(&self) -> MirrorParams {
        MirrorParams::default()
            .with_intensity(self.session.default_intensity)
            .with_persona(self.session.parse_persona().0)
            .with_auto_classify(self.session.auto_classify)
            .with_retry(self.retry.to_policy())
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Empty or duplicate brain ids, empty model names
    /// 2. Session and classifier references to unknown brains
    /// 3. Ranges (window size, confidence threshold)
    /// 4. Persona name
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Brain definitions
        let mut seen = HashSet::new();
        for (i, brain) in self.brains.iter().enumerate() {
            if brain.id.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: format!("brains[{i}].id"),
                    },
                    format!("brains[{i}].id cannot be empty"),
                ));
            } else if !seen.insert(brain.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateBrain {
                        brain_id: brain.id.clone(),
                    },
                    format!("brain id '{}' is defined more than once", brain.id),
                ));
            }
            if brain.model.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: format!("brains[{i}].model"),
                    },
                    format!("brains[{i}].model cannot be empty"),
                ));
            }
        }

        // 2. Brain references
        let mut check_ref = |field: &str, id: &str, severity: Severity| {
            if self.brain(id).is_none() {
                issues.push(ConfigIssue {
                    severity,
                    code: ConfigIssueCode::UnknownBrain {
                        field: field.to_string(),
                        brain_id: id.to_string(),
                    },
                    message: format!("{field}: no brain with id '{id}'"),
                });
            }
        };
        check_ref(
            "session.original_brain_id",
            &self.session.original_brain_id,
            Severity::Error,
        );
        check_ref(
            "session.challenger_brain_id",
            &self.session.challenger_brain_id,
            Severity::Warning,
        );
        if self.session.judge_enabled {
            check_ref(
                "session.judge_brain_id",
                &self.session.judge_brain_id,
                Severity::Warning,
            );
        }
        if self.classifier.mode == FileClassifierMode::Brain {
            check_ref(
                "classifier.brain_id",
                &self.classifier.brain_id,
                Severity::Warning,
            );
        }

        // 3. Ranges
        if self.session.history_window_size == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "session.history_window_size".to_string(),
                },
                "session.history_window_size must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.classifier.confidence_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "classifier.confidence_threshold".to_string(),
                },
                format!(
                    "classifier.confidence_threshold must be between 0 and 1 (got {})",
                    self.classifier.confidence_threshold
                ),
            ));
        }

        // 4. Persona
        issues.extend(self.session.parse_persona().1);

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_application::BrainProvider;
    use mirror_domain::{Intensity, Persona};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[session]
original_brain_id = "local"
challenger_brain_id = "gpt-4o"
default_intensity = "aggressive"
history_window_size = 8
auto_classify = false
default_persona = "regulator"

[ui]
layout = "stacked"
color = false

[[brains]]
id = "local"
provider = "mock"
model = "echo"

[[brains]]
id = "gpt-4o"
provider = "openai"
model = "gpt-4o"
api_key_env_var = "WORK_OPENAI_KEY"

[classifier]
mode = "heuristic"

[retry]
max_retries = 3
base_delay_ms = 50
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.default_intensity, Intensity::Aggressive);
        assert_eq!(config.session.history_window_size, 8);
        assert!(!config.ui.color);
        assert_eq!(config.brains.len(), 2);
        assert_eq!(config.brains[0].provider, BrainProvider::Mock);
        assert_eq!(config.brain("gpt-4o").unwrap().api_key_env(), "WORK_OPENAI_KEY");
        assert_eq!(config.classifier.mode, FileClassifierMode::Heuristic);

        let params = config.mirror_params();
        assert_eq!(params.persona, Some(Persona::Regulator));
        assert!(!params.auto_classify);
        assert_eq!(params.retry.max_retries, 3);

        // judge_brain_id still points at the default brain, which was replaced
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::UnknownBrain { field, .. } if field == "session.judge_brain_id"
        ));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[session]
default_intensity = "mild"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.default_intensity, Intensity::Mild);
        // Defaults should apply
        assert_eq!(config.session.original_brain_id, DEFAULT_ORIGINAL_BRAIN);
        assert_eq!(config.brains.len(), 3);
        assert!(config.session.auto_classify);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.session.challenger_brain_id, DEFAULT_CHALLENGER_BRAIN);
        assert!(config.session.judge_enabled);
        assert_eq!(config.session.history_window_size, 20);
        assert_eq!(config.classifier.confidence_threshold, 0.75);
        assert!(config.ui.show_latency);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = FileConfig::default();
        config.brains.push(FileBrainConfig::new("gpt-4o", BrainProvider::OpenAi, ""));
        config.session.original_brain_id = "missing".into();
        config.session.history_window_size = 0;
        config.classifier.confidence_threshold = 1.5;

        let issues = config.validate();
        let errors = issues.iter().filter(|i| i.is_error()).count();
        assert_eq!(errors, 5);
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::DuplicateBrain { brain_id } if brain_id == "gpt-4o"
        )));
    }
}
