//! UI configuration from TOML (`[ui]` section)

use serde::{Deserialize, Serialize};

/// How the two answers are laid out in the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileLayout {
    #[default]
    SideBySide,
    Stacked,
}

/// Raw UI configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUiConfig {
    pub layout: FileLayout,
    pub show_token_counts: bool,
    pub show_latency: bool,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileUiConfig {
    fn default() -> Self {
        Self {
            layout: FileLayout::SideBySide,
            show_token_counts: false,
            show_latency: true,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_deserialize() {
        let toml_str = r#"
[ui]
layout = "stacked"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ui.layout, FileLayout::Stacked);
        assert!(config.ui.show_latency);
    }
}
