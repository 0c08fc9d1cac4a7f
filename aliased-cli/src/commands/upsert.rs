//! Upsert command handler
//!
//! Renders every account in `state.json` through the user's template and
//! splices the result into `~/.aws/config`.

use aliased_core::{AccountStore, paths};
use anyhow::{Context, Result, bail};
use colored::*;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::render::{DEFAULT_TEMPLATE, HandlebarsRenderer};
use crate::splice::insert_profiles;

/// Handle the upsert command
pub fn handle_upsert_command(config: &Config) -> Result<()> {
    let count = upsert_aws_config(config)?;
    println!(
        "{} {} profile group(s) in {}",
        "Updated".green(),
        count,
        config.paths.aws_config_file().display().to_string().cyan()
    );
    Ok(())
}

/// Returns the number of accounts rendered
fn upsert_aws_config(config: &Config) -> Result<usize> {
    let template_path = config.paths.template_file();
    let template = match std::fs::read_to_string(&template_path) {
        Ok(template) => template,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            print_template_hint(&template_path);
            bail!("no profile template at {}", template_path.display());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read template {}", template_path.display()));
        }
    };
    let renderer = HandlebarsRenderer::new(&template)?;

    let store = AccountStore::at(&config.paths);
    let accounts = store.read().map_err(|e| {
        if e.is_not_found() {
            anyhow::anyhow!("{} (run `fetch` first)", e)
        } else {
            e.into()
        }
    })?;
    info!("Rendering {} account(s)", accounts.len());

    let profiles = renderer.render_all(&accounts)?;

    let config_path = config.paths.aws_config_file();
    let current = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    let updated = insert_profiles(&current, &profiles)?;
    paths::write_file(&config_path, updated.as_bytes())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(accounts.len())
}

fn print_template_hint(path: &Path) {
    println!(
        "Looks like there is no template at '{}'\nHere's an example of what to place there...",
        path.display()
    );
    println!("{}", DEFAULT_TEMPLATE);
}
