//! Configuration for the external tool invocations.
//!
//! Reads from environment variables (a `.env` file is loaded by main
//! before this runs). Everything has a working default; configuration only
//! exists to point at differently named or out-of-PATH tools and to size
//! the container.

use std::env;

/// Default container size in bytes (2 GiB).
pub const DEFAULT_IMAGE_SIZE: u64 = 1 << 31;

/// Default filesystem label for formatted containers.
pub const DEFAULT_LABEL: &str = "diskforge";

/// Diskforge configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Formatting utility (default: mke2fs).
    pub mkfs_tool: String,
    /// Replay tool that executes the population script (default: ext2img).
    pub populate_tool: String,
    /// Container size in bytes.
    pub image_size: u64,
    /// Filesystem label.
    pub fs_label: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Self {
        let mkfs_tool = env::var("DISKFORGE_MKFS").unwrap_or_else(|_| "mke2fs".to_string());
        let populate_tool =
            env::var("DISKFORGE_POPULATE").unwrap_or_else(|_| "ext2img".to_string());
        let image_size = env::var("DISKFORGE_IMAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_IMAGE_SIZE);
        let fs_label =
            env::var("DISKFORGE_LABEL").unwrap_or_else(|_| DEFAULT_LABEL.to_string());

        Self {
            mkfs_tool,
            populate_tool,
            image_size,
            fs_label,
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  DISKFORGE_MKFS: {}", self.mkfs_tool);
        println!("  DISKFORGE_POPULATE: {}", self.populate_tool);
        println!("  DISKFORGE_IMAGE_SIZE: {}", self.image_size);
        println!("  DISKFORGE_LABEL: {}", self.fs_label);
    }
}
