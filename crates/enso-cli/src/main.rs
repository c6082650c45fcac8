//! `ensoc`: command-line driver for Enso export resolution
//!
//! Loads a project manifest, resolves the exports of its modules and prints
//! the compilation order, the resolved tables or the diagnostics.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use termcolor::ColorChoice;

mod commands;
mod logger;
mod output;

use output::StyledOutput;

#[derive(Parser)]
#[command(name = "ensoc")]
#[command(about = "Enso export resolution driver", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// When to use colors
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compilation order of the project modules
    Order {
        /// Project manifest (.toml or .json)
        manifest: PathBuf,
        /// Only sort; skip cycle detection and symbol resolution
        #[arg(long)]
        fast: bool,
    },

    /// Resolve exports and print every module's tables
    Resolve {
        /// Project manifest (.toml or .json)
        manifest: PathBuf,
        /// Output format
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "json"])]
        format: String,
    },

    /// Resolve exports and report diagnostics
    Check {
        /// Project manifest (.toml or .json)
        manifest: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let color = output::resolve_color_choice(cli.color.as_deref());
    logger::init_logger(cli.verbose, cli.quiet, color == ColorChoice::Never);
    let mut out = StyledOutput::new(color);

    let result = match cli.command {
        Commands::Order { manifest, fast } => commands::order::execute(&manifest, fast, &mut out),
        Commands::Resolve { manifest, format } => commands::resolve::execute(&manifest, &format, &mut out),
        Commands::Check { manifest } => commands::check::execute(&manifest, &mut out),
    };

    out.flush();
    result
}
