//! CLI commands.

mod manifest;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// deckctl - tooling for deck plugins.
#[derive(Debug, Parser)]
#[command(name = "deckctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json).
    #[arg(long, global = true, default_value = "text", env = "DECKCTL_FORMAT")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate and validate plugin manifests.
    Manifest(manifest::ManifestCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext {
            format: match self.format.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Text,
            },
        };

        match self.command {
            Commands::Manifest(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("deckctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub format: OutputFormat,
}
