//! Plan command - emit the population script without touching an image.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::SourceManifest;
use crate::plan;

/// Assemble the script and write it to `output` (or stdout).
pub fn cmd_plan(manifest_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let manifest = SourceManifest::load(manifest_path)?;
    let script = plan::assemble(&manifest)?;

    match output {
        Some(path) => {
            fs::write(&path, format!("{}\n", script))
                .with_context(|| format!("Failed to write script to {}", path.display()))?;
            eprintln!(
                "Wrote {} commands to {}",
                script.lines().count(),
                path.display()
            );
        }
        None => println!("{}", script),
    }

    Ok(())
}
