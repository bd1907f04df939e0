//! Copy-tree expansion: walk a host directory and register every file.
//!
//! Each artifact source tree is expanded with a target prefix, an ordered
//! list of literal substring replacements, and an optional extension
//! filter. Only regular files are policy targets here; directories for the
//! resolved targets are created later by the ancestor closure.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

use super::paths::join_target;
use super::registry::CopyRegistry;

/// Walk `base_dir` and register every surviving file into the registry as
/// an override of its resolved target path.
///
/// The target directory for a file is its path relative to `base_dir`,
/// prefixed with `target_prefix` (or mapped to `/` when both are empty),
/// with each substitution applied in order as a literal replace. When an
/// extension filter is given, only files whose final dotted extension is a
/// member survive.
pub fn expand_tree(
    registry: &mut CopyRegistry,
    base_dir: &Path,
    target_prefix: &str,
    substitutions: &[(String, String)],
    extensions: Option<&BTreeSet<String>>,
) -> Result<()> {
    for entry in WalkDir::new(base_dir).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to walk artifact tree {}", base_dir.display())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.depth() == 0 {
            // The walk root itself is a file, not a tree.
            bail!(
                "Artifact tree {} is a file, expected a directory",
                base_dir.display()
            );
        }

        if let Some(extensions) = extensions {
            let matches = entry
                .path()
                .extension()
                .map(|ext| extensions.contains(&ext.to_string_lossy().into_owned()))
                .unwrap_or(false);
            if !matches {
                continue;
            }
        }

        // entry is a file strictly below base_dir, so both unwraps hold.
        let relative_dir = entry
            .path()
            .parent()
            .unwrap()
            .strip_prefix(base_dir)
            .unwrap()
            .to_string_lossy()
            .into_owned();

        let mut target_dir = if !target_prefix.is_empty() {
            if relative_dir.is_empty() {
                target_prefix.trim_end_matches('/').to_string()
            } else {
                format!("{}/{}", target_prefix.trim_end_matches('/'), relative_dir)
            }
        } else if relative_dir.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", relative_dir)
        };

        for (from, to) in substitutions {
            target_dir = target_dir.replace(from.as_str(), to.as_str());
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        registry.register(entry.path(), join_target(&target_dir, &name), true);
    }

    Ok(())
}
