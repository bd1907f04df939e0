//! Container creation and replay-tool invocation.
//!
//! The engine itself never touches the image: the formatting utility
//! produces a valid, empty filesystem container, and the replay tool
//! applies the population script strictly in file order. Both are external
//! collaborators; a non-zero exit from either is fatal.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::process::Cmd;

/// Create a sparse container file and format it as an empty filesystem.
pub fn create_container(config: &Config, image: &Path) -> Result<()> {
    let file = fs::File::create(image)
        .with_context(|| format!("Failed to create image file {}", image.display()))?;
    file.set_len(config.image_size)
        .with_context(|| format!("Failed to size image file {}", image.display()))?;
    drop(file);

    Cmd::new(&config.mkfs_tool)
        .arg("-q")
        .args(["-O", "^dir_index"]) // no directory b-trees yet
        .args(["-I", "128"]) // 128-byte inodes, grub-legacy can't use bigger
        .arg("-F")
        .args(["-L", &config.fs_label])
        .arg_path(image)
        .error_msg("Failed to format the image container")
        .run()?;

    Ok(())
}

/// Replay the population script into a formatted image.
///
/// The script lives in a named temporary file scoped to this one
/// invocation; the replay tool reads it with `-c` and applies the commands
/// in file order.
pub fn populate(config: &Config, image: &Path, script: &str) -> Result<()> {
    let mut script_file =
        tempfile::NamedTempFile::new().context("Failed to create the script temp file")?;
    script_file
        .write_all(script.as_bytes())
        .context("Failed to write the population script")?;
    script_file
        .flush()
        .context("Failed to flush the population script")?;

    Cmd::new(&config.populate_tool)
        .arg("-q")
        .arg("-c")
        .arg_path(script_file.path())
        .arg("-f")
        .arg_path(image)
        .error_msg("Image population failed")
        .run()?;

    Ok(())
}
