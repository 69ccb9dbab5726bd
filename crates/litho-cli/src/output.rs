//! Output helpers shared by all commands.
//!
//! Text mode writes human-readable lines; JSON mode writes exactly one JSON
//! document to stdout so the output can be piped into other tools.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a command result.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}: failed to serialize result: {}", "Error".red().bold(), e),
        },
        // Text callers format their own output.
        OutputFormat::Text => {}
    }
}

/// Progress note, text mode only.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    eprintln!("{} {}", "→".blue(), message);
}

pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("{} {}", "✓".green().bold(), message);
}

pub fn warning(message: &str, format: OutputFormat, quiet: bool) {
    if quiet || matches!(format, OutputFormat::Json) {
        return;
    }
    println!("  {} {}", "⚠".yellow(), message);
}
