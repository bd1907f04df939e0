//! The copy registry: host path to target path overrides.
//!
//! Build artifacts (kernel, initrd, configuration database, everything
//! discovered by tree expansion) claim target paths here. The base-image
//! scanner consults the registry so an override silently wins over the
//! corresponding base-tree entry instead of conflicting with it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Mapping from host path to the set of image paths it populates.
///
/// Backed by ordered maps so iteration is deterministic: two runs over
/// identical inputs must produce byte-identical scripts.
#[derive(Debug, Default)]
pub struct CopyRegistry {
    copies: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl CopyRegistry {
    /// Register a copy from `host` to `target`.
    ///
    /// With `override_existing`, any prior target set for `host` is
    /// discarded and replaced; otherwise `target` accumulates as another
    /// alias of the same host file. Explicitly listed artifacts and every
    /// tree-walk discovery register as overrides.
    pub fn register(
        &mut self,
        host: impl Into<PathBuf>,
        target: impl Into<String>,
        override_existing: bool,
    ) {
        let host = host.into();
        let target = target.into();
        match self.copies.get_mut(&host) {
            Some(targets) if !override_existing => {
                targets.insert(target);
            }
            _ => {
                self.copies.insert(host, BTreeSet::from([target]));
            }
        }
    }

    /// True if any host path claims `target`. Used by the base-image
    /// scanner to detect suppression.
    pub fn contains_target(&self, target: &str) -> bool {
        self.copies.values().any(|targets| targets.contains(target))
    }

    /// All registered copies, sorted by host path.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, &BTreeSet<String>)> {
        self.copies
            .iter()
            .map(|(host, targets)| (host.as_path(), targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_override_accumulates_aliases() {
        let mut registry = CopyRegistry::default();
        registry.register("build/libc.so", "/libraries/libc.so", false);
        registry.register("build/libc.so", "/libraries/libc.so.6", false);

        assert!(registry.contains_target("/libraries/libc.so"));
        assert!(registry.contains_target("/libraries/libc.so.6"));
    }

    #[test]
    fn test_override_replaces_whole_set() {
        let mut registry = CopyRegistry::default();
        registry.register("build/kernel", "/kernel-old", false);
        registry.register("build/kernel", "/boot/kernel", true);

        assert!(!registry.contains_target("/kernel-old"));
        assert!(registry.contains_target("/boot/kernel"));
    }

    #[test]
    fn test_contains_target_misses() {
        let mut registry = CopyRegistry::default();
        registry.register("build/passwd", "/etc/passwd", true);

        assert!(!registry.contains_target("/etc/group"));
        assert!(!registry.contains_target("build/passwd"));
    }

    #[test]
    fn test_entries_sorted_by_host() {
        let mut registry = CopyRegistry::default();
        registry.register("zeta/file", "/z", true);
        registry.register("alpha/file", "/a", true);
        registry.register("mid/file", "/m", true);

        let hosts: Vec<&Path> = registry.entries().map(|(host, _)| host).collect();
        assert_eq!(
            hosts,
            [
                Path::new("alpha/file"),
                Path::new("mid/file"),
                Path::new("zeta/file")
            ]
        );
    }
}
