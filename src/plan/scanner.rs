//! Base-image scanner and ancestor closure.
//!
//! The scanner walks the pre-populated base tree depth-first and emits
//! commands directly: `mkdir` for each directory (once, tracked through the
//! visited set), `write`/`symlink` for files, `chmod 755` where the host
//! file carries an execute bit. Files whose target path is claimed by the
//! copy registry are suppressed with a notice so that build artifacts win
//! over base-tree content.
//!
//! Directories under the per-identity area (`/users/<name>`) are bracketed
//! with `defaultowner` commands and collected into owned blocks; the
//! sequencer keeps those blocks intact because the ownership commands only
//! mean something in their emitted position.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::command::{Command, Step};
use super::owners::Identities;
use super::paths::{self, join_target};
use super::registry::CopyRegistry;

/// Target directory whose one-level subdirectories belong to identities.
pub const IDENTITY_ROOT: &str = "/users";

/// Commands for copying one host file to an image target: the `write`,
/// plus `chmod 755` when any host execute bit is set. No other permission
/// value is ever set explicitly; everything else relies on the replay
/// tool's default mode.
pub fn file_commands(host: &Path, target: &str) -> Result<Vec<Command>> {
    let metadata = fs::metadata(host)
        .with_context(|| format!("Failed to stat host file {}", host.display()))?;

    let mut commands = vec![Command::Write {
        host: host.to_path_buf(),
        target: target.to_string(),
    }];
    if metadata.permissions().mode() & 0o111 != 0 {
        commands.push(Command::Chmod {
            target: target.to_string(),
            mode: 0o755,
        });
    }
    Ok(commands)
}

/// Emit the minimal set of missing parent-directory commands for
/// `target_dir`, memoized against the visited set. `/` always exists and
/// never emits a command.
pub fn ensure_dir(steps: &mut Vec<Step>, visited: &mut BTreeSet<String>, target_dir: &str) {
    if target_dir == "/" || visited.contains(target_dir) {
        return;
    }
    ensure_dir(steps, visited, paths::parent_target(target_dir));
    steps.push(Step::Single(Command::Mkdir {
        target: target_dir.to_string(),
    }));
    visited.insert(target_dir.to_string());
}

/// Walks the base tree and accumulates command steps plus the set of
/// directories known to exist once those steps have run.
pub struct BaseImageScanner<'a> {
    registry: &'a CopyRegistry,
    identities: &'a Identities,
    visited: BTreeSet<String>,
    steps: Vec<Step>,
}

impl<'a> BaseImageScanner<'a> {
    pub fn new(registry: &'a CopyRegistry, identities: &'a Identities) -> Self {
        Self {
            registry,
            identities,
            visited: BTreeSet::new(),
            steps: Vec::new(),
        }
    }

    /// Walk the base tree rooted at `base_dir`, mapping it onto `/`.
    pub fn scan(&mut self, base_dir: &Path) -> Result<()> {
        self.scan_dir(base_dir, "/")
    }

    /// Consume the scanner, yielding the emitted steps and the visited set
    /// for the ancestor closure to continue growing.
    pub fn into_parts(self) -> (Vec<Step>, BTreeSet<String>) {
        (self.steps, self.visited)
    }

    /// The identity owning `target_dir`, when its path sits under the
    /// identity area and its first component there is a known username.
    fn bracket_identity(&self, target_dir: &str) -> Option<(u32, u32)> {
        let rest = target_dir
            .strip_prefix(IDENTITY_ROOT)?
            .strip_prefix('/')?;
        let username = rest.split('/').next()?;
        self.identities.lookup(username)
    }

    fn scan_dir(&mut self, host_dir: &Path, target_dir: &str) -> Result<()> {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        let reader = fs::read_dir(host_dir)
            .with_context(|| format!("Failed to read base tree directory {}", host_dir.display()))?;
        for entry in reader {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", host_dir.display()))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
            if file_type.is_dir() {
                subdirs.push(entry.file_name());
            } else {
                // Symlinks (including symlinks to directories) are handled
                // as file entries below.
                files.push(entry.file_name());
            }
        }
        // Host readdir order is arbitrary; sort for reproducible scripts.
        subdirs.sort();
        files.sort();

        let bracket = self.bracket_identity(target_dir);
        let mut commands = Vec::new();

        if let Some((uid, gid)) = bracket {
            commands.push(Command::DefaultOwner { uid, gid });
        }
        if target_dir != "/" && !self.visited.contains(target_dir) {
            commands.push(Command::Mkdir {
                target: target_dir.to_string(),
            });
        }
        self.visited.insert(target_dir.to_string());

        for name in &files {
            let name = name.to_string_lossy();
            let host = host_dir.join(name.as_ref());
            let target = join_target(target_dir, &name);

            if self.registry.contains_target(&target) {
                eprintln!(
                    "Target {} will be overridden by the registered build artifacts.",
                    target
                );
                continue;
            }

            let metadata = fs::symlink_metadata(&host)
                .with_context(|| format!("Failed to stat {}", host.display()))?;
            if metadata.file_type().is_symlink() {
                let link_value = fs::read_link(&host)
                    .with_context(|| format!("Failed to read symlink {}", host.display()))?;
                // An absolute link pointing back into the directory being
                // walked would bake a host path into the image; rewrite it
                // relative to that directory instead.
                let link = if link_value.is_absolute() {
                    match link_value.strip_prefix(host_dir) {
                        Ok(rel) => rel.to_string_lossy().into_owned(),
                        Err(_) => link_value.to_string_lossy().into_owned(),
                    }
                } else {
                    link_value.to_string_lossy().into_owned()
                };
                commands.push(Command::Symlink { target, link });
            } else if metadata.is_file() {
                commands.extend(file_commands(&host, &target)?);
            }
            // Other node types (sockets, fifos) have no image representation.
        }

        match bracket {
            Some((uid, gid)) => {
                // One-level identity directories additionally get an explicit
                // chown; deeper directories only inherit via defaultowner.
                if paths::depth(target_dir) == paths::depth(IDENTITY_ROOT) + 1 {
                    commands.push(Command::Chown {
                        target: target_dir.to_string(),
                        uid,
                        gid,
                    });
                }
                commands.push(Command::DefaultOwner { uid: 0, gid: 0 });
                self.steps.push(Step::OwnedBlock {
                    dir: target_dir.to_string(),
                    commands,
                });
            }
            None => {
                self.steps.extend(commands.into_iter().map(Step::Single));
            }
        }

        for name in &subdirs {
            let name = name.to_string_lossy();
            let sub_target = join_target(target_dir, &name);
            self.scan_dir(&host_dir.join(name.as_ref()), &sub_target)?;
        }

        Ok(())
    }
}
