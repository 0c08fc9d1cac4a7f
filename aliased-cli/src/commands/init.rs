//! Init command handler
//!
//! Places the default profile template in the tool directory.

use aliased_core::paths;
use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

use crate::config::Config;
use crate::render::DEFAULT_TEMPLATE;

/// Handle the init command
pub fn handle_init_command(config: &Config) -> Result<()> {
    let path = write_default_template(config)?;
    println!(
        "{} {}",
        "New template placed at".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

/// Creates the tool directory if needed and (over)writes the template
fn write_default_template(config: &Config) -> Result<PathBuf> {
    config
        .paths
        .ensure_tool_dir()
        .context("Failed to create the tool directory")?;

    let path = config.paths.template_file();
    paths::write_file(&path, DEFAULT_TEMPLATE.as_bytes())
        .with_context(|| format!("Failed to write template to {}", path.display()))?;

    Ok(path)
}
