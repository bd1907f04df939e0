//! Build command - assemble, format, and populate a disk image.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::image;
use crate::manifest::SourceManifest;
use crate::plan;

/// Execute the full pipeline: plan, format, replay.
pub fn cmd_build(manifest_path: &Path, image_path: &Path, config: &Config) -> Result<()> {
    println!("=== Building disk image ===\n");

    println!("Assembling population script...");
    let manifest = SourceManifest::load(manifest_path)?;
    let script = plan::assemble(&manifest)?;
    println!("  {} commands", script.lines().count());

    println!(
        "Formatting container at {} ({} MB)...",
        image_path.display(),
        config.image_size / 1024 / 1024
    );
    image::create_container(config, image_path)?;

    println!("Populating image with {}...", config.populate_tool);
    image::populate(config, image_path, &script)?;

    println!("\n=== Image ready: {} ===", image_path.display());
    Ok(())
}
