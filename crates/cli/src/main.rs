//! triagent CLI: the main entry point.
//!
//! Commands:
//! - `triage`: Validity + severity analysis, comment and priority update
//! - `investigate`: Research history and learned patterns for an issue
//! - `patterns`: Query and maintain the pattern store
//! - `config`: Show or initialize configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use triagent_config::AppConfig;
use triagent_core::Outcome;

mod commands;

#[derive(Parser)]
#[command(
    name = "triagent",
    about = "triagent: support ticket triage and investigation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.triagent/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a support ticket
    Triage {
        /// Ticket identifier, e.g. SP-123
        ticket_id: String,
    },

    /// Investigate an issue against history and learned patterns
    Investigate {
        /// Issue identifier, e.g. SP-123
        issue_id: String,
    },

    /// Query and maintain learned resolution patterns
    Patterns {
        #[command(subcommand)]
        action: PatternsAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PatternsAction {
    /// Find patterns matching an issue description
    Find {
        text: String,

        /// Minimum confidence (defaults to patterns.min_confidence)
        #[arg(long)]
        min_confidence: Option<f64>,
    },

    /// Record how an issue that used a pattern turned out
    Outcome {
        pattern_id: String,

        /// `resolved` or `not_resolved`
        outcome: Outcome,
    },

    /// List every stored pattern
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration with secrets redacted
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    let load = || {
        AppConfig::load_with_env(&config_path).map_err(|e| format!("Failed to load config: {e}"))
    };

    match cli.command {
        Commands::Triage { ticket_id } => commands::triage::run(&load()?, &ticket_id).await?,
        Commands::Investigate { issue_id } => {
            commands::investigate::run(&load()?, &issue_id).await?
        }
        Commands::Patterns { action } => match action {
            PatternsAction::Find {
                text,
                min_confidence,
            } => commands::patterns::find(&load()?, &text, min_confidence)?,
            PatternsAction::Outcome {
                pattern_id,
                outcome,
            } => commands::patterns::outcome(&load()?, &pattern_id, outcome)?,
            PatternsAction::List => commands::patterns::list(&load()?)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&load()?)?,
            ConfigAction::Init { force } => commands::config_cmd::init(&config_path, force)?,
        },
    }

    Ok(())
}
