//! Output formatting for CLI commands.

use colored::Colorize;
use serde_json::Value;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON.
    Json,
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print a warning line.
pub fn print_warning(message: &str) {
    println!("{} {}", "Invalid:".yellow().bold(), message);
}

/// Print a JSON value on one line.
pub fn print_json(value: &Value) {
    println!("{value}");
}
