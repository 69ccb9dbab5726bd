//! lithophane config command - print the effective configuration.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::commands::{SpecOverrides, load_spec};
use crate::{Cli, OutputFormat, output};

pub fn run(config: Option<&Path>, overrides: SpecOverrides, cli: &Cli) -> Result<()> {
    let spec = load_spec(config, overrides)?;

    match cli.format {
        OutputFormat::Json => output::print(&spec, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                let toml = spec.to_toml().context("Failed to serialize configuration")?;
                let source = config
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "defaults".to_string());
                println!("{} {}", "#".dimmed(), format!("validated from {}", source).dimmed());
                print!("{}", toml);
            }
        }
    }

    Ok(())
}
