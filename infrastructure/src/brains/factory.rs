//! Building brains and classifiers from configuration

use super::{AnthropicBrain, GeminiBrain, MockBrain, OpenAiBrain};
use crate::config::{FileBrainConfig, FileClassifierMode, FileConfig};
use mirror_application::{
    BrainAdapter, BrainError, BrainIntentClassifier, BrainProvider, BrainRegistry,
    HeuristicIntentClassifier, IntentClassifier,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Env variables that switch every brain to [`MockBrain`]
pub const MOCK_ENV_VARS: [&str; 2] = ["MIRROR_MOCK_BRAINS", "MOCK_BRAINS"];

const MOCK_CHUNK_DELAY: Duration = Duration::from_millis(15);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactoryError {
    #[error("Unknown brain: {0} (see `mirror brains list`)")]
    UnknownBrain(String),

    #[error("Cannot create brain '{id}': {source}")]
    Brain {
        id: String,
        #[source]
        source: BrainError,
    },
}

/// Whether a mock toggle is set in the environment
pub fn mock_brains_from_env() -> bool {
    MOCK_ENV_VARS.iter().any(|var| {
        std::env::var(var)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    })
}

pub struct BrainFactory;

impl BrainFactory {
    /// Create the adapter for one configured brain.
    ///
    /// With `use_mock` every provider is replaced by a [`MockBrain`] keeping
    /// the configured id.
    pub fn create(
        config: &FileBrainConfig,
        use_mock: bool,
    ) -> Result<Arc<dyn BrainAdapter>, FactoryError> {
        Self::create_with_model(config, None, use_mock)
    }

    /// Like [`create`](Self::create), overriding the configured model
    pub fn create_with_model(
        config: &FileBrainConfig,
        model: Option<&str>,
        use_mock: bool,
    ) -> Result<Arc<dyn BrainAdapter>, FactoryError> {
        let id = config.id.as_str();
        let model = model.unwrap_or(&config.model);
        let base_url = config.base_url.as_deref();
        let key_env = config.api_key_env();

        if use_mock || config.provider == BrainProvider::Mock {
            debug!("Creating mock brain {}", id);
            return Ok(Arc::new(MockBrain::new(id).with_chunk_delay(MOCK_CHUNK_DELAY)));
        }

        debug!("Creating {} brain {} (model {})", config.provider, id, model);
        let brain: Result<Arc<dyn BrainAdapter>, BrainError> = match config.provider {
            BrainProvider::OpenAi => {
                OpenAiBrain::from_env(id, model, key_env, base_url)
                    .map(|b| Arc::new(b) as Arc<dyn BrainAdapter>)
            }
            BrainProvider::Anthropic => {
                AnthropicBrain::from_env(id, model, key_env, base_url)
                    .map(|b| Arc::new(b) as Arc<dyn BrainAdapter>)
            }
            BrainProvider::Gemini => {
                GeminiBrain::from_env(id, model, key_env, base_url)
                    .map(|b| Arc::new(b) as Arc<dyn BrainAdapter>)
            }
            BrainProvider::Mock => Ok(Arc::new(MockBrain::new(id)) as Arc<dyn BrainAdapter>),
        };
        brain.map_err(|source| FactoryError::Brain {
            id: id.to_string(),
            source,
        })
    }

    /// Create the brain with `id` from the configuration
    pub fn create_by_id(
        config: &FileConfig,
        id: &str,
        use_mock: bool,
    ) -> Result<Arc<dyn BrainAdapter>, FactoryError> {
        let brain = config
            .brain(id)
            .ok_or_else(|| FactoryError::UnknownBrain(id.to_string()))?;
        Self::create(brain, use_mock)
    }

    /// Register every configured brain that can be created, skipping the rest
    pub fn registry(config: &FileConfig, use_mock: bool) -> (BrainRegistry, Vec<FactoryError>) {
        let mut registry = BrainRegistry::new();
        let mut failures = Vec::new();
        for brain in &config.brains {
            match Self::create(brain, use_mock) {
                Ok(adapter) => {
                    if let Err(source) = registry.register(adapter) {
                        failures.push(FactoryError::Brain {
                            id: brain.id.clone(),
                            source,
                        });
                    }
                }
                Err(e) => failures.push(e),
            }
        }
        (registry, failures)
    }
}

/// Pick the intent classifier for this configuration.
///
/// Brain mode needs a resolvable, creatable brain; anything else falls back to
/// the heuristic classifier. Mock runs always use the heuristic so they stay
/// offline and deterministic.
pub fn build_classifier(config: &FileConfig, use_mock: bool) -> Arc<dyn IntentClassifier> {
    if use_mock || config.classifier.mode == FileClassifierMode::Heuristic {
        return Arc::new(HeuristicIntentClassifier);
    }

    let Some(brain_config) = config.brain(&config.classifier.brain_id) else {
        debug!(
            "Classifier brain not found: {}. Using heuristic.",
            config.classifier.brain_id
        );
        return Arc::new(HeuristicIntentClassifier);
    };

    match BrainFactory::create_with_model(brain_config, config.classifier.model.as_deref(), false)
    {
        Ok(brain) => Arc::new(
            BrainIntentClassifier::new(brain).with_threshold(config.classifier.confidence_threshold),
        ),
        Err(e) => {
            warn!("Failed to init classifier: {}. Using heuristic.", e);
            Arc::new(HeuristicIntentClassifier)
        }
    }
}
