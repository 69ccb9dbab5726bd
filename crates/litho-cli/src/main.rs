//! lithophane: Command-line interface for cylindrical lithophane generation.
//!
//! Builds certified lithophane cylinders from normalized intensity images and
//! inspects cylinder configurations, suitable for scripting and batch jobs.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=litho_shell=info` - Basic operation logging
//! - `RUST_LOG=litho_shell=debug` - Detailed progress logging
//! - `RUST_LOG=litho_mesh::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Build with a configuration file
//! lithophane build photo.json --config cylinder.toml
//!
//! # Check a configuration and see how large the mesh will be
//! lithophane estimate --config cylinder.toml --image-width 800 --image-height 600
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use litho_shell::{DEFAULT_LAYER_HEIGHT_MM, ImageCategory};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{SpecOverrides, build, config, estimate};

/// lithophane - Generate printable cylindrical lithophanes.
///
/// Maps image brightness to wall thickness and wraps it around a cylinder.
#[derive(Parser)]
#[command(name = "lithophane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Configuration source shared by every subcommand.
#[derive(Args)]
struct SpecArgs {
    /// Cylinder configuration (TOML); defaults are used when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the image coverage angle (degrees)
    #[arg(long)]
    coverage: Option<f64>,

    /// Override the tessellation resolution (mm)
    #[arg(long)]
    resolution: Option<f64>,

    /// Pick the gamma for an image category (e.g. portrait, shadow-heavy)
    #[arg(long)]
    category: Option<String>,
}

impl SpecArgs {
    fn overrides(&self) -> Result<SpecOverrides> {
        let category = self
            .category
            .as_deref()
            .map(str::parse::<ImageCategory>)
            .transpose()?;
        Ok(SpecOverrides {
            coverage: self.coverage,
            resolution: self.resolution,
            category,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a lithophane from an intensity image and report on it
    Build {
        /// Intensity image as JSON: {"width", "height", "data"}
        input: PathBuf,

        #[command(flatten)]
        spec: SpecArgs,

        /// Layer height used for the print estimate (mm)
        #[arg(long, default_value_t = DEFAULT_LAYER_HEIGHT_MM)]
        layer_height: f64,
    },

    /// Validate a configuration and print it as TOML
    Config {
        #[command(flatten)]
        spec: SpecArgs,
    },

    /// Predict tessellation and mesh size without building
    Estimate {
        #[command(flatten)]
        spec: SpecArgs,

        /// Image width in pixels
        #[arg(long, requires = "image_height")]
        image_width: Option<usize>,

        /// Image height in pixels
        #[arg(long, requires = "image_width")]
        image_height: Option<usize>,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "litho_mesh=info,litho_shell=info",
            2 => "litho_mesh=debug,litho_shell=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Build {
            input,
            spec,
            layer_height,
        } => build::run(
            input,
            spec.config.as_deref(),
            spec.overrides()?,
            *layer_height,
            cli,
        ),
        Commands::Config { spec } => config::run(spec.config.as_deref(), spec.overrides()?, cli),
        Commands::Estimate {
            spec,
            image_width,
            image_height,
        } => {
            let image_size = image_width.zip(*image_height);
            estimate::run(spec.config.as_deref(), spec.overrides()?, image_size, cli)
        }
    }
}

fn report_error(e: &anyhow::Error) {
    if let Some(err) = e.downcast_ref::<litho_shell::LithophaneError>() {
        eprintln!("{}: {}", "Error".red().bold(), err);
        eprintln!("  {}: {}", "Code".cyan(), err.code());
        eprintln!("  {}: {}", "Suggestion".green(), err.recovery_suggestion());
    } else if let Some(mesh_err) = e.downcast_ref::<litho_mesh::MeshError>() {
        eprintln!("{}: {}", "Error".red().bold(), mesh_err);
        eprintln!("  {}: {}", "Code".cyan(), mesh_err.code());
        eprintln!(
            "  {}: {}",
            "Suggestion".green(),
            mesh_err.recovery_suggestion()
        );
    } else {
        eprintln!("{}: {}", "Error".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {}: {}", "Caused by".yellow(), cause);
        }
    }
}

fn main() -> Result<()> {
    // Nicer panic reports in development builds
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        if !cli.quiet {
            report_error(&e);
        }
        std::process::exit(1);
    }

    Ok(())
}
