//! Population commands and the command sequencer.
//!
//! The replay tool consumes a flat script of whitespace-separated commands
//! and executes them strictly in file order. It has no path-creation
//! intelligence of its own, so the sequencer here carries the whole burden
//! of ordering: every directory must be created before anything is written
//! beneath it.

use std::fmt;
use std::path::PathBuf;

use super::paths;

/// A single low-level filesystem operation for the replay tool.
///
/// Commands are immutable once created; the only thing that changes is
/// their position within the final ordered script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a directory inside the image.
    Mkdir { target: String },
    /// Copy a host file into the image.
    Write { host: PathBuf, target: String },
    /// Set permission bits on an image path.
    Chmod { target: String, mode: u32 },
    /// Create a symlink inside the image.
    Symlink { target: String, link: String },
    /// Set the owner of an existing image path.
    Chown { target: String, uid: u32, gid: u32 },
    /// Change the default owner applied to subsequently created entries.
    DefaultOwner { uid: u32, gid: u32 },
}

impl Command {
    /// Category rank in the fixed batch order (mkdir, write, symlink, chmod).
    ///
    /// `Chown` and `DefaultOwner` never appear as free-standing commands;
    /// they travel inside owned blocks, which sort at mkdir rank.
    fn rank(&self) -> usize {
        match self {
            Command::Mkdir { .. } => 0,
            Command::Write { .. } => 1,
            Command::Symlink { .. } => 2,
            Command::Chmod { .. } => 3,
            Command::Chown { .. } | Command::DefaultOwner { .. } => 0,
        }
    }

    /// Depth of the command's target path, for the secondary sort key.
    fn target_depth(&self) -> usize {
        match self {
            Command::Mkdir { target }
            | Command::Write { target, .. }
            | Command::Chmod { target, .. }
            | Command::Symlink { target, .. }
            | Command::Chown { target, .. } => paths::depth(target),
            Command::DefaultOwner { .. } => 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Mkdir { target } => write!(f, "mkdir {}", target),
            Command::Write { host, target } => {
                write!(f, "write {} {}", host.display(), target)
            }
            Command::Chmod { target, mode } => write!(f, "chmod {} {:o}", target, mode),
            Command::Symlink { target, link } => write!(f, "symlink {} {}", target, link),
            Command::Chown { target, uid, gid } => {
                write!(f, "chown {} {} {}", target, uid, gid)
            }
            Command::DefaultOwner { uid, gid } => write!(f, "defaultowner {} {}", uid, gid),
        }
    }
}

/// One schedulable unit for the sequencer.
#[derive(Debug, Clone)]
pub enum Step {
    /// A single command, free to move within its category batch.
    Single(Command),
    /// The full bracket emitted for one identity-owned directory:
    /// `defaultowner`, the directory's own commands, the optional `chown`,
    /// `defaultowner 0 0`. The ownership commands are only meaningful in
    /// this exact position, so the block is never torn apart.
    OwnedBlock { dir: String, commands: Vec<Command> },
}

impl Step {
    fn sort_key(&self) -> (usize, usize) {
        match self {
            Step::Single(cmd) => (cmd.rank(), cmd.target_depth()),
            // Owned blocks sort with the mkdir batch at the depth of the
            // directory they bracket: every ancestor directory is strictly
            // shallower and therefore already created.
            Step::OwnedBlock { dir, .. } => (0, paths::depth(dir)),
        }
    }
}

/// Total-order the command steps into the final script sequence.
///
/// Primary key is the category rank, secondary key is target path depth;
/// ties keep their input order (stable sort). This guarantees that all
/// `mkdir` commands for shallower directories run before deeper ones, and
/// that every `write`/`symlink`/`chmod` runs after the mkdir batch.
pub fn sequence(mut steps: Vec<Step>) -> Vec<Command> {
    steps.sort_by_key(|step| step.sort_key());

    let mut out = Vec::new();
    for step in steps {
        match step {
            Step::Single(cmd) => out.push(cmd),
            Step::OwnedBlock { commands, .. } => out.extend(commands),
        }
    }
    out
}

/// Render the ordered command sequence as the replay script.
pub fn render_script(commands: &[Command]) -> String {
    let lines: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
    lines.join("\n")
}
