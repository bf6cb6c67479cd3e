//! CLI entrypoint for adversarial-mirror
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod app;
mod commands;

use anyhow::{Context, Result, anyhow};
use app::App;
use clap::Parser;
use mirror_infrastructure::{ConfigLoader, FileConfig, JsonHistoryStore};
use mirror_presentation::{
    BrainsCommand, Cli, Command, ConfigCommand, ConsoleFormatter, GlobalArgs, HistoryCommand,
};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&cli.global);
    info!("Starting adversarial-mirror");

    let config = load_config(&cli.global)?;
    if !config.ui.color {
        ConsoleFormatter::set_color_enabled(false);
    }

    let command = cli.selected_command();
    let app = App::new(config, cli.global);

    match command {
        Command::Chat => commands::run::chat(&app).await,
        Command::Mirror { question } => commands::run::mirror(&app, &question).await,
        Command::Config(sub) => {
            match sub {
                ConfigCommand::Show => commands::config::show(&app.config)?,
                ConfigCommand::Path => commands::config::path(),
                ConfigCommand::Set { key, value } => commands::config::set(&key, &value)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Brains(sub) => {
            match sub {
                BrainsCommand::List => commands::brains::list(&app.config),
                BrainsCommand::Test { id } => commands::brains::test(&app, &id).await?,
                BrainsCommand::Add(args) => commands::brains::add(&app.config, &args)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::History(sub) => {
            let store = JsonHistoryStore::default_location()
                .ok_or_else(|| anyhow!("No data directory on this system"))?;
            match sub {
                HistoryCommand::List { limit } => commands::history::list(&store, limit).await?,
                HistoryCommand::Show { id } => commands::history::show(&store, &id).await?,
                HistoryCommand::Export { id, file } => {
                    commands::history::export(&store, &id, &file).await?
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so they never interleave with streamed answers
fn init_logging(args: &GlobalArgs) {
    let level = match (args.verbose, args.debug) {
        (0, false) => "warn",
        (1, false) => "info",
        (0..=2, _) => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &GlobalArgs) -> Result<FileConfig> {
    let config = if args.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?
    };

    for issue in config.validate() {
        if issue.is_error() {
            error!("Config: {}", issue.message);
        } else {
            warn!("Config: {}", issue.message);
        }
    }
    Ok(config)
}
