//! Brain definitions from TOML (`[[brains]]` array)

use mirror_application::BrainProvider;
use serde::{Deserialize, Serialize};

/// One configured brain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBrainConfig {
    pub id: String,
    pub provider: BrainProvider,
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env_var: String,
    /// Override of the provider's API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl FileBrainConfig {
    pub fn new(id: impl Into<String>, provider: BrainProvider, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider,
            model: model.into(),
            api_key_env_var: provider.default_api_key_env().to_string(),
            base_url: None,
        }
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env_var = var.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Variable to read the key from, falling back to the provider default
    pub fn api_key_env(&self) -> &str {
        if self.api_key_env_var.is_empty() {
            self.provider.default_api_key_env()
        } else {
            &self.api_key_env_var
        }
    }
}

/// The brains shipped in the default configuration
pub fn default_brains() -> Vec<FileBrainConfig> {
    vec![
        FileBrainConfig::new(
            "claude-sonnet-4-6",
            BrainProvider::Anthropic,
            "claude-sonnet-4-6",
        ),
        FileBrainConfig::new("gpt-4o", BrainProvider::OpenAi, "gpt-4o"),
        FileBrainConfig::new("gemini-pro", BrainProvider::Gemini, "gemini-2.5-pro"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_var_uses_provider_default() {
        let toml_str = r#"
id = "local"
provider = "openai"
model = "llama3"
base_url = "http://localhost:11434/v1"
"#;
        let brain: FileBrainConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(brain.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(brain.base_url.as_deref(), Some("http://localhost:11434/v1"));
    }

    #[test]
    fn test_default_brains() {
        let brains = default_brains();
        assert_eq!(brains.len(), 3);
        assert_eq!(brains[2].api_key_env(), "GOOGLE_API_KEY");
    }
}
