//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use mirror_domain::{Intensity, Persona};
use std::path::PathBuf;

/// Challenger intensity, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntensityArg {
    Mild,
    Moderate,
    Aggressive,
}

impl From<IntensityArg> for Intensity {
    fn from(value: IntensityArg) -> Self {
        match value {
            IntensityArg::Mild => Intensity::Mild,
            IntensityArg::Moderate => Intensity::Moderate,
            IntensityArg::Aggressive => Intensity::Aggressive,
        }
    }
}

/// CLI arguments for adversarial-mirror
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about = "Ask one model, let another one argue with it")]
#[command(long_about = r#"
Adversarial Mirror sends your question to an original brain and, in parallel,
to a challenger brain instructed to find what the original missed. An optional
judge brain then reconciles both answers and scores their agreement.

Factual lookups are answered directly; everything else is mirrored. Use
--no-classify to always mirror, or --no-mirror to never mirror.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/adversarial-mirror/config.toml   Global config
2. ./mirror.toml or ./.mirror.toml           Project config
3. --config <path>                           Explicit config file
4. MIRROR_* environment variables             e.g. MIRROR_SESSION__DEFAULT_INTENSITY=aggressive

Example:
  mirror                                 Start an interactive chat
  mirror mirror "Should I use microservices?"
  mirror --intensity aggressive --persona vc-skeptic mirror "Is my startup idea good?"
  mirror --mock mirror "Try it without API keys"
"#)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The selected command, `chat` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Challenger intensity
    #[arg(long, value_enum, global = true)]
    pub intensity: Option<IntensityArg>,

    /// Override the original brain
    #[arg(long, value_name = "BRAIN_ID", global = true)]
    pub original: Option<String>,

    /// Override the challenger brain
    #[arg(long, value_name = "BRAIN_ID", global = true)]
    pub challenger: Option<String>,

    /// Challenger persona (vc-skeptic, security-auditor, end-user, regulator, contrarian)
    #[arg(long, value_name = "PERSONA", value_parser = parse_persona, global = true)]
    pub persona: Option<Persona>,

    /// Disable mirroring; only the original brain answers
    #[arg(long, global = true)]
    pub no_mirror: bool,

    /// Disable intent classification; always mirror
    #[arg(long, global = true)]
    pub no_classify: bool,

    /// Disable the judge pass
    #[arg(long, global = true)]
    pub no_judge: bool,

    /// Use mock brains instead of real providers
    #[arg(long, global = true)]
    pub mock: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

fn parse_persona(raw: &str) -> Result<Persona, String> {
    raw.parse::<Persona>().map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive session
    Chat,

    /// One-shot query
    Mirror {
        /// The question to ask
        question: String,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Brain management commands
    #[command(subcommand)]
    Brains(BrainsCommand),

    /// History commands
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Show configuration file locations
    Path,
    /// Set a value in the global config by dotted key (e.g. session.default_intensity)
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BrainsCommand {
    /// List configured brains
    List,
    /// Ping a brain
    Test { id: String },
    /// Add a new brain to the global config
    Add(AddBrainArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct AddBrainArgs {
    /// Unique brain id
    #[arg(long)]
    pub id: String,

    /// Provider (anthropic, openai, gemini, mock)
    #[arg(long)]
    pub provider: String,

    /// Model name
    #[arg(long)]
    pub model: String,

    /// Environment variable holding the API key (provider default if omitted)
    #[arg(long, value_name = "VAR")]
    pub api_key_env: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum HistoryCommand {
    /// List recorded runs, newest first
    List {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one entry as JSON
    Show { id: String },
    /// Write one entry as JSON to a file
    Export { id: String, file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_chat() {
        let cli = Cli::parse_from(["mirror"]);
        assert_eq!(cli.selected_command(), Command::Chat);

        let cli = Cli::parse_from(["mirror", "--intensity", "aggressive"]);
        assert_eq!(cli.selected_command(), Command::Chat);
        assert_eq!(cli.global.intensity, Some(IntensityArg::Aggressive));
    }

    #[test]
    fn test_mirror_with_global_flags() {
        let cli = Cli::parse_from([
            "mirror",
            "mirror",
            "Should I use microservices?",
            "--no-classify",
            "--persona",
            "vc-skeptic",
            "--mock",
        ]);
        assert_eq!(
            cli.selected_command(),
            Command::Mirror {
                question: "Should I use microservices?".to_string()
            }
        );
        assert!(cli.global.no_classify);
        assert!(cli.global.mock);
        assert_eq!(cli.global.persona, Some(Persona::VcSkeptic));
    }

    #[test]
    fn test_unknown_persona_rejected() {
        let result = Cli::try_parse_from(["mirror", "--persona", "pirate", "chat"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::parse_from(["mirror", "config", "set", "ui.color", "false"]);
        assert_eq!(
            cli.selected_command(),
            Command::Config(ConfigCommand::Set {
                key: "ui.color".into(),
                value: "false".into()
            })
        );

        let cli = Cli::parse_from([
            "mirror", "brains", "add", "--id", "local", "--provider", "openai", "--model",
            "llama3",
        ]);
        let Command::Brains(BrainsCommand::Add(args)) = cli.selected_command() else {
            panic!("expected brains add");
        };
        assert_eq!(args.id, "local");
        assert_eq!(args.api_key_env, None);

        let cli = Cli::parse_from(["mirror", "history", "export", "abc", "out.json"]);
        assert_eq!(
            cli.selected_command(),
            Command::History(HistoryCommand::Export {
                id: "abc".into(),
                file: PathBuf::from("out.json")
            })
        );
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["mirror", "-vv", "history", "list"]);
        assert_eq!(cli.global.verbose, 2);
    }
}
