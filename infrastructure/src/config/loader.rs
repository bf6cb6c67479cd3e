//! Configuration file loader with multi-source merging

use super::file_config::{FileBrainConfig, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const APP_DIR: &str = "adversarial-mirror";
const PROJECT_FILES: [&str; 2] = ["mirror.toml", ".mirror.toml"];
const ENV_PREFIX: &str = "MIRROR_";
const SETTABLE_SECTIONS: [&str; 4] = ["session", "ui", "classifier", "retry"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0} (expected session.*, ui.*, classifier.* or retry.*)")]
    InvalidKey(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Could not determine the config directory")]
    NoConfigDir,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `MIRROR_SECTION__KEY`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./mirror.toml` or `./.mirror.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/adversarial-mirror/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::figment(config_path).extract().map_err(|e| Box::new(e).into())
    }

    /// The merged provider stack used by [`load`](Self::load)
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!("Loading project config {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            debug!("Loading explicit config {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/adversarial-mirror/config.toml if set,
    /// otherwise falls back to ~/.config/adversarial-mirror/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {ENV_PREFIX}SECTION__KEY");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./mirror.toml or ./.mirror.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }

    /// Set one dotted key (e.g. `session.default_intensity`) in the global file
    pub fn set_global_value(key: &str, raw: &str) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::set_value_at(&path, key, raw)?;
        Ok(path)
    }

    /// Set one dotted key in the TOML file at `path`, creating it if needed.
    ///
    /// The value is read as a bool, integer or float when it looks like one,
    /// otherwise as a string. The file is only written if the result still
    /// deserializes as a [`FileConfig`].
    pub fn set_value_at(path: &Path, key: &str, raw: &str) -> Result<(), ConfigError> {
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        match segments.first() {
            Some(section) if segments.len() > 1 && SETTABLE_SECTIONS.contains(section) => {}
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        }

        let current = Self::read_table(path)?;

        let mut table = current.clone();
        Self::insert_at(&mut table, &segments, parse_scalar(raw), key)?;
        if let Err(typed_err) = Self::check(&table) {
            // "4" for a model name should still be a string
            table = current;
            Self::insert_at(&mut table, &segments, toml::Value::String(raw.to_string()), key)?;
            Self::check(&table).map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: typed_err,
            })?;
        }

        Self::write_table(path, &table)
    }

    /// Append a brain to the effective brain list and persist the list at `path`
    pub fn add_brain_at(
        path: &Path,
        current: &FileConfig,
        brain: FileBrainConfig,
    ) -> Result<(), ConfigError> {
        if current.brain(&brain.id).is_some() {
            return Err(ConfigError::InvalidValue {
                key: "brains".to_string(),
                message: format!("a brain with id '{}' already exists", brain.id),
            });
        }

        let mut brains = current.brains.clone();
        brains.push(brain);

        let mut table = Self::read_table(path)?;
        table.insert("brains".to_string(), toml::Value::try_from(&brains)?);
        Self::write_table(path, &table)
    }

    fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
        if !path.exists() {
            return Ok(toml::Table::new());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse::<toml::Table>().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_table(path: &Path, table: &toml::Table) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string_pretty(table)?;
        std::fs::write(path, text).map_err(io_err)
    }

    fn insert_at(
        table: &mut toml::Table,
        segments: &[&str],
        value: toml::Value,
        key: &str,
    ) -> Result<(), ConfigError> {
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;

        let mut cursor = table;
        for segment in parents {
            let entry = cursor
                .entry(segment.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            cursor = entry
                .as_table_mut()
                .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        }
        cursor.insert(last.to_string(), value);
        Ok(())
    }

    fn check(table: &toml::Table) -> Result<(), String> {
        toml::Value::Table(table.clone())
            .try_into::<FileConfig>()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

fn parse_scalar(raw: &str) -> toml::Value {
    let trimmed = raw.trim();
    if let Ok(b) = trimmed.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = trimmed.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}
