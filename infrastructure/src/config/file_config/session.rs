//! Session configuration from TOML (`[session]` section)

use super::super::validation::{ConfigIssue, ConfigIssueCode};
use mirror_domain::{Intensity, Persona};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORIGINAL_BRAIN: &str = "claude-sonnet-4-6";
pub const DEFAULT_CHALLENGER_BRAIN: &str = "gpt-4o";

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Brain that answers directly
    pub original_brain_id: String,
    /// Brain that critiques the original
    pub challenger_brain_id: String,
    pub default_intensity: Intensity,
    /// Maximum number of messages kept in a chat session
    pub history_window_size: usize,
    /// Run the intent classifier before each question
    pub auto_classify: bool,
    pub judge_enabled: bool,
    pub judge_brain_id: String,
    /// Persona name, e.g. "security-auditor"
    pub default_persona: Option<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            original_brain_id: DEFAULT_ORIGINAL_BRAIN.to_string(),
            challenger_brain_id: DEFAULT_CHALLENGER_BRAIN.to_string(),
            default_intensity: Intensity::Moderate,
            history_window_size: mirror_domain::conversation::DEFAULT_HISTORY_WINDOW,
            auto_classify: true,
            judge_enabled: true,
            judge_brain_id: DEFAULT_ORIGINAL_BRAIN.to_string(),
            default_persona: None,
        }
    }
}

impl FileSessionConfig {
    /// Parse `default_persona`; unknown names are reported and ignored
    pub fn parse_persona(&self) -> (Option<Persona>, Vec<ConfigIssue>) {
        let Some(name) = self.default_persona.as_deref() else {
            return (None, vec![]);
        };
        match name.parse::<Persona>() {
            Ok(persona) => (Some(persona), vec![]),
            Err(_) => (
                None,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "session.default_persona".to_string(),
                        value: name.to_string(),
                        valid_values: Persona::ALL.iter().map(|p| p.to_string()).collect(),
                    },
                    format!("session.default_persona: unknown persona '{name}', ignoring"),
                )],
            ),
        }
    }
}
