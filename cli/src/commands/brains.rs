//! `brains list|test|add`

use crate::app::App;
use anyhow::{Context, Result, anyhow, bail};
use mirror_application::BrainProvider;
use mirror_infrastructure::{BrainFactory, ConfigLoader, FileBrainConfig, FileConfig};
use mirror_presentation::{AddBrainArgs, ConsoleFormatter};

pub fn list(config: &FileConfig) {
    if config.brains.is_empty() {
        println!("No brains configured.");
        return;
    }
    let rows: Vec<Vec<String>> = config
        .brains
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.provider.to_string(),
                b.model.clone(),
                b.api_key_env().to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        ConsoleFormatter::table(&["ID", "PROVIDER", "MODEL", "API_KEY_ENV"], &rows)
    );
}

pub async fn test(app: &App, id: &str) -> Result<()> {
    let brain = BrainFactory::create_by_id(&app.config, id, app.use_mock())
        .with_context(|| format!("Brain test failed: {id}"))?;
    let result = brain.ping().await;
    if !result.ok {
        bail!(
            "Brain test failed: {}",
            result.error.as_deref().unwrap_or("ping failed")
        );
    }
    match result.latency_ms {
        Some(ms) => println!("Brain {} ok ({}ms)", id, ms),
        None => println!("Brain {} ok", id),
    }
    Ok(())
}

/// Parse the add arguments into a brain definition
pub fn brain_from_args(args: &AddBrainArgs) -> Result<FileBrainConfig> {
    let provider: BrainProvider = args
        .provider
        .parse()
        .map_err(|e| anyhow!("Unsupported provider '{}': {}", args.provider, e))?;
    let key_env = args
        .api_key_env
        .clone()
        .unwrap_or_else(|| provider.default_api_key_env().to_string());
    Ok(FileBrainConfig::new(args.id.as_str(), provider, args.model.as_str()).with_api_key_env(key_env))
}

pub fn add(config: &FileConfig, args: &AddBrainArgs) -> Result<()> {
    let brain = brain_from_args(args)?;
    let path = ConfigLoader::global_config_path()
        .ok_or_else(|| anyhow!("No configuration directory on this system"))?;
    ConfigLoader::add_brain_at(&path, config, brain)
        .with_context(|| format!("Failed to add brain {}", args.id))?;
    println!("Added brain {} to {}.", args.id, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(provider: &str, key: Option<&str>) -> AddBrainArgs {
        AddBrainArgs {
            id: "local".into(),
            provider: provider.into(),
            model: "llama3".into(),
            api_key_env: key.map(str::to_string),
        }
    }

    #[test]
    fn test_brain_from_args_uses_provider_key_default() {
        let brain = brain_from_args(&args("openai", None)).unwrap();
        assert_eq!(brain.provider, BrainProvider::OpenAi);
        assert_eq!(brain.api_key_env(), "OPENAI_API_KEY");

        let brain = brain_from_args(&args("gemini", Some("MY_KEY"))).unwrap();
        assert_eq!(brain.api_key_env(), "MY_KEY");
    }

    #[test]
    fn test_brain_from_args_rejects_unknown_provider() {
        assert!(brain_from_args(&args("cohere", None)).is_err());
    }
}
