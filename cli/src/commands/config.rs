//! `config show|path|set`

use anyhow::{Context, Result};
use mirror_infrastructure::{ConfigLoader, FileConfig};

pub fn show(config: &FileConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Could not render configuration")?;
    print!("{}", text);

    let issues = config.validate();
    if !issues.is_empty() {
        println!();
        for issue in issues {
            let label = if issue.is_error() { "error" } else { "warning" };
            println!("# {}: {}", label, issue.message);
        }
    }
    Ok(())
}

pub fn path() {
    ConfigLoader::print_config_sources();
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let path = ConfigLoader::set_global_value(key, value)
        .with_context(|| format!("Failed to set {key}"))?;
    println!("Set {} = {} in {}", key, value, path.display());
    Ok(())
}
