//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod process;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ApiKey, Settings};

#[derive(Parser)]
#[command(name = "qalam")]
#[command(about = "Extract text from scanned documents and translate Arabic to English")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API key for the Gemini API
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image and translate it if it is Arabic
    Process {
        /// Image file (PNG, JPG, WEBP), or '-' to read an image or data URL from stdin
        input: PathBuf,
        /// Output the run as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify the API key and model are usable
    Check,

    /// Show the effective configuration
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process { input, json } => {
            // Resolve the key before touching the input so a missing key fails first.
            let api_key = ApiKey::resolve(cli.api_key.as_deref())?;
            process::cmd_process(&settings, api_key, &input, json).await
        }
        Commands::Check => {
            let api_key = ApiKey::resolve(cli.api_key.as_deref())?;
            check::cmd_check(&settings, api_key).await
        }
        Commands::Config => config_cmd::cmd_config(
            &settings,
            cli.config.as_deref(),
            cli.api_key.as_deref(),
        ),
    }
}
