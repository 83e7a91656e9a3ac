//! deckctl - CLI for deck plugin authors
//!
//! Offline tooling around the plugin bundle: generating and validating
//! `manifest.json`.

use clap::Parser;

mod commands;
mod error;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }
}
