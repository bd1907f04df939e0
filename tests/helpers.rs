//! Shared test utilities for diskforge tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use diskforge::manifest::SourceManifest;

/// Test environment with a base tree and a build directory, plus the four
/// explicit artifacts every manifest needs.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Base image tree (maps onto `/`)
    pub base_tree: PathBuf,
    /// Host build artifacts
    pub build_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with dummy kernel, initrd, loader
    /// config, and an empty configuration database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_tree = temp_dir.path().join("base");
        let build_dir = temp_dir.path().join("build");
        fs::create_dir_all(&base_tree).expect("Failed to create base tree");
        fs::create_dir_all(&build_dir).expect("Failed to create build dir");

        for name in ["kernel", "initrd.tar", "menu.lst"] {
            fs::write(build_dir.join(name), name).expect("Failed to write artifact");
        }
        // A zero-length file is a valid (empty) SQLite database; ownership
        // resolution degrades to root-only.
        fs::write(build_dir.join("config.db"), "").expect("Failed to write config db");

        Self {
            _temp_dir: temp_dir,
            base_tree,
            build_dir,
        }
    }

    /// Manifest pointing at this environment's trees and artifacts.
    pub fn manifest(&self) -> SourceManifest {
        SourceManifest {
            base_tree: self.base_tree.clone(),
            config_db: self.build_dir.join("config.db"),
            kernel: self.build_dir.join("kernel"),
            initrd: self.build_dir.join("initrd.tar"),
            loader_config: self.build_dir.join("menu.lst"),
            binaries: Vec::new(),
            copy_trees: Vec::new(),
        }
    }

    /// Write a file under the base tree.
    pub fn write_base_file(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.base_tree.join(relative), content)
    }

    /// Write a file under the build directory.
    pub fn write_build_file(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.build_dir.join(relative), content)
    }

    /// Replace the empty configuration database with a populated one.
    ///
    /// IDs are the raw (1-based) store values.
    pub fn create_config_db(&self, groups: &[(i64, &str)], users: &[(i64, &str, &str)]) {
        let path = self.build_dir.join("config.db");
        fs::remove_file(&path).expect("Failed to remove empty config db");

        let conn = rusqlite::Connection::open(&path).expect("Failed to create config db");
        conn.execute("create table groups (gid integer, name text)", [])
            .unwrap();
        conn.execute(
            "create table users (uid integer, username text, groupname text)",
            [],
        )
        .unwrap();
        for &(gid, name) in groups {
            conn.execute("insert into groups values (?1, ?2)", (gid, name))
                .unwrap();
        }
        for &(uid, username, groupname) in users {
            conn.execute(
                "insert into users values (?1, ?2, ?3)",
                (uid, username, groupname),
            )
            .unwrap();
        }
    }
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

/// Set the user execute bit on a file.
pub fn make_executable(path: &Path) {
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to set permissions");
}
