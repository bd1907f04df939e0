//! Diskforge - deterministic disk image assembler.
//!
//! Merges a static base tree, build artifact trees, and an ownership
//! database into one ordered population script, then hands the script to
//! an external replay tool against a freshly formatted container.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use diskforge::commands;
use diskforge::config::Config;

#[derive(Parser)]
#[command(name = "diskforge")]
#[command(about = "Assemble deterministic disk images from base trees and build artifacts")]
#[command(
    after_help = "QUICK START:\n  diskforge preflight        Check external tools\n  diskforge plan m.json      Print the population script\n  diskforge build m.json     Build a populated disk image"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a formatted, populated disk image
    Build {
        /// Source manifest (JSON)
        manifest: PathBuf,
        /// Output image path
        #[arg(short, long, default_value = "disk.img")]
        output: PathBuf,
    },

    /// Emit the population script without touching an image
    Plan {
        /// Source manifest (JSON)
        manifest: PathBuf,
        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the external tools are available
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    match cli.command {
        Commands::Build { manifest, output } => {
            commands::cmd_build(&manifest, &output, &config)?;
        }
        Commands::Plan { manifest, output } => {
            commands::cmd_plan(&manifest, output)?;
        }
        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }
        Commands::Show { what } => match what {
            ShowTarget::Config => commands::cmd_show_config(&config)?,
        },
    }

    Ok(())
}
