//! Preflight checks for the external collaborators.

use anyhow::{bail, Result};

use crate::config::Config;

/// Check that the formatting utility and the replay tool are reachable.
pub fn cmd_preflight(config: &Config, strict: bool) -> Result<()> {
    let tools = [
        (
            config.mkfs_tool.as_str(),
            "e2fsprogs",
            "Formats the empty image container",
        ),
        (
            config.populate_tool.as_str(),
            "image population tool",
            "Replays the command script into the image",
        ),
    ];

    let mut failures = 0;
    for (tool, package, purpose) in tools {
        match which::which(tool) {
            Ok(path) => println!("[PASS] {} ({})", tool, path.display()),
            Err(_) => {
                failures += 1;
                println!("[FAIL] {} - {} (provided by {})", tool, purpose, package);
            }
        }
    }

    if failures > 0 {
        if strict {
            bail!("{} preflight check(s) failed", failures);
        }
        eprintln!("[WARN] {} preflight check(s) failed", failures);
    }

    Ok(())
}
