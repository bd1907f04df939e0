//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Assemble, format, and populate a disk image
//! - `plan` - Emit the population script without touching an image
//! - `preflight` - Check external tool availability
//! - `show` - Display information

pub mod build;
pub mod plan;
pub mod preflight;
pub mod show;

pub use build::cmd_build;
pub use plan::cmd_plan;
pub use preflight::cmd_preflight;
pub use show::cmd_show_config;
