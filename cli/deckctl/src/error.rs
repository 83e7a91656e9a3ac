//! Error handling and display for the CLI.

use colored::Colorize;
use deck_manifest::ManifestError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(CliError::Manifest(ManifestError::Parse(_))) = err.downcast_ref::<CliError>() {
        eprintln!(
            "\n{}",
            "Hint: manifest keys are PascalCase, e.g. \"CodePath\" and \"SDKVersion\".".yellow()
        );
    }
}
