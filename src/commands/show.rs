//! Show command - display information.

use anyhow::Result;

use crate::config::Config;

/// Show the current configuration.
pub fn cmd_show_config(config: &Config) -> Result<()> {
    config.print();
    Ok(())
}
