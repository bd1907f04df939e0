//! Source manifest: declares everything that goes into an image.
//!
//! The manifest is a JSON file listing the base tree, the explicit boot
//! artifacts, loose build binaries, and the artifact trees to expand.
//! Relative paths are resolved against the manifest's own directory so a
//! manifest can live next to the build it describes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the assembly engine consumes, in one declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceManifest {
    /// Static, pre-populated skeleton copied largely verbatim into the image.
    pub base_tree: PathBuf,
    /// System configuration database (also the ownership store).
    pub config_db: PathBuf,
    /// Kernel image.
    pub kernel: PathBuf,
    /// Initrd archive.
    pub initrd: PathBuf,
    /// Boot-loader configuration file.
    pub loader_config: PathBuf,
    /// Loose build binaries, placed by category (applications, libraries,
    /// modules).
    #[serde(default)]
    pub binaries: Vec<PathBuf>,
    /// Artifact trees expanded file-by-file into the copy registry.
    #[serde(default)]
    pub copy_trees: Vec<CopyTree>,
}

/// One artifact tree expansion.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyTree {
    pub source: PathBuf,
    /// Target prefix; empty maps the tree onto `/`.
    #[serde(default)]
    pub target_prefix: String,
    /// Ordered literal substring replacements applied to target paths.
    #[serde(default)]
    pub replacements: Vec<(String, String)>,
    /// When set, only files with one of these final extensions survive.
    #[serde(default)]
    pub extensions: Option<BTreeSet<String>>,
}

impl SourceManifest {
    /// Load a manifest, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        if let Some(dir) = path.parent() {
            manifest.resolve_relative_to(dir);
        }
        Ok(manifest)
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        resolve(&mut self.base_tree, dir);
        resolve(&mut self.config_db, dir);
        resolve(&mut self.kernel, dir);
        resolve(&mut self.initrd, dir);
        resolve(&mut self.loader_config, dir);
        for binary in &mut self.binaries {
            resolve(binary, dir);
        }
        for tree in &mut self.copy_trees {
            resolve(&mut tree.source, dir);
        }
    }
}

fn resolve(path: &mut PathBuf, dir: &Path) {
    if path.is_relative() {
        *path = dir.join(&*path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{
                "base_tree": "images/local",
                "config_db": "build/config.db",
                "kernel": "/abs/kernel",
                "initrd": "build/initrd.tar",
                "loader_config": "images/grub/menu.lst",
                "binaries": ["build/src/user/ls"],
                "copy_trees": [
                    {"source": "images/base", "replacements": [["/a", "/b"]]}
                ]
            }"#,
        )
        .unwrap();

        let manifest = SourceManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.base_tree, temp.path().join("images/local"));
        assert_eq!(manifest.kernel, PathBuf::from("/abs/kernel"));
        assert_eq!(manifest.binaries[0], temp.path().join("build/src/user/ls"));
        assert_eq!(manifest.copy_trees[0].source, temp.path().join("images/base"));
        assert_eq!(
            manifest.copy_trees[0].replacements,
            [("/a".to_string(), "/b".to_string())]
        );
    }

    #[test]
    fn test_optional_sections_default_empty() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{
                "base_tree": "images/local",
                "config_db": "config.db",
                "kernel": "kernel",
                "initrd": "initrd.tar",
                "loader_config": "menu.lst"
            }"#,
        )
        .unwrap();

        let manifest = SourceManifest::load(&manifest_path).unwrap();
        assert!(manifest.binaries.is_empty());
        assert!(manifest.copy_trees.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("manifest.json");
        fs::write(
            &manifest_path,
            r#"{"base_tree": "x", "config_db": "y", "kernel": "k",
                "initrd": "i", "loader_config": "l", "bogus": true}"#,
        )
        .unwrap();

        assert!(SourceManifest::load(&manifest_path).is_err());
    }
}
