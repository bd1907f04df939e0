//! Filesystem image assembly engine.
//!
//! Merges the static base tree, the registered build artifacts, and the
//! ownership database into one deterministic, ordered command script for
//! the external image population tool:
//!
//! 1. Load identities from the configuration database (root-only on
//!    failure).
//! 2. Register explicit artifacts and expand artifact trees into the copy
//!    registry.
//! 3. Scan the base tree, suppressing anything the registry claims.
//! 4. Replay the registry, closing over missing ancestor directories.
//! 5. Sequence everything into the final script.
//!
//! The engine is a single-threaded batch computation: it either produces a
//! complete script or fails outright. Nothing here touches the image.

pub mod command;
pub mod owners;
pub mod paths;
pub mod registry;
pub mod scanner;
pub mod walker;

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::manifest::SourceManifest;
use command::{Command, Step};
use owners::Identities;
use registry::CopyRegistry;
use scanner::BaseImageScanner;

/// Image path of the configuration database.
pub const CONFIG_DB_TARGET: &str = "/.config-root";
/// Image path of the boot-loader configuration.
pub const LOADER_CONFIG_TARGET: &str = "/boot/grub/menu.lst";
/// Image path of the kernel.
pub const KERNEL_TARGET: &str = "/boot/kernel";
/// Image path of the initrd archive.
pub const INITRD_TARGET: &str = "/boot/initrd.tar";

const APPLICATIONS_DIR: &str = "/applications";
const LIBRARIES_DIR: &str = "/libraries";
const MODULES_DIR: &str = "/system/modules";

// Fixed compatibility symlink appended after sequencing, so /bin/sh style
// invocations resolve inside the image.
const SH_COMPAT_TARGET: &str = "/applications/sh";
const SH_COMPAT_LINK: &str = "/applications/bash";

/// Assemble the full population script from the manifest's sources.
pub fn assemble(manifest: &SourceManifest) -> Result<String> {
    let identities = Identities::load(&manifest.config_db)?;

    let mut registry = CopyRegistry::default();
    registry.register(&manifest.config_db, CONFIG_DB_TARGET, true);
    registry.register(&manifest.loader_config, LOADER_CONFIG_TARGET, true);
    registry.register(&manifest.kernel, KERNEL_TARGET, true);
    registry.register(&manifest.initrd, INITRD_TARGET, true);

    for binary in &manifest.binaries {
        let target = classify_binary(binary)?;
        registry.register(binary, target, true);
    }

    for tree in &manifest.copy_trees {
        walker::expand_tree(
            &mut registry,
            &tree.source,
            &tree.target_prefix,
            &tree.replacements,
            tree.extensions.as_ref(),
        )?;
    }

    let mut scanner = BaseImageScanner::new(&registry, &identities);
    scanner.scan(&manifest.base_tree)?;
    let (mut steps, mut visited) = scanner.into_parts();

    // Replay the registry: every override target gets its parent directories
    // closed over, then its write. Targets sourced purely from build
    // artifacts live outside the base tree, so the scanner never saw their
    // parents.
    for (host, targets) in registry.entries() {
        for target in targets {
            scanner::ensure_dir(&mut steps, &mut visited, paths::parent_target(target));
            if host.is_file() {
                steps.extend(
                    scanner::file_commands(host, target)?
                        .into_iter()
                        .map(Step::Single),
                );
            } else if host.is_dir() {
                bail!(
                    "Host path \"{}\" for target path {} is a directory, expected a file.",
                    host.display(),
                    target
                );
            } else {
                bail!(
                    "Host file \"{}\" for target path {} does not exist.",
                    host.display(),
                    target
                );
            }
        }
    }

    let mut commands = command::sequence(steps);
    commands.push(Command::Symlink {
        target: SH_COMPAT_TARGET.to_string(),
        link: SH_COMPAT_LINK.to_string(),
    });

    Ok(command::render_script(&commands))
}

/// Place a build binary by category.
///
/// Binaries from the userland build tree go to `/applications`, modules to
/// `/system/modules`, and anything named `lib*.so` from either tree to
/// `/libraries`. Everything else lands directly under `/`.
fn classify_binary(host: &Path) -> Result<String> {
    let name = host
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Build binary {} has no file name", host.display()))?;
    let dir = host.parent().unwrap_or_else(|| Path::new(""));
    let is_library = name.starts_with("lib") && name.ends_with(".so");

    let prefix = if dir.ends_with("src/user") {
        if is_library {
            LIBRARIES_DIR
        } else {
            APPLICATIONS_DIR
        }
    } else if dir.ends_with("src/modules") {
        if is_library {
            LIBRARIES_DIR
        } else {
            MODULES_DIR
        }
    } else {
        "/"
    };

    Ok(paths::join_target(prefix, &name))
}
