//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::RefName;
use crate::ui::output;

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let value = match key {
        "default_branch" => ctx.config.default_branch().to_string(),
        "keep_notes" => ctx.config.keep_notes().to_string(),
        "output.json" => ctx.config.json_default().to_string(),
        _ => bail!("Unknown configuration key: {}", key),
    };
    println!("{}", value);
    Ok(())
}

/// Set a configuration value in the global config file.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut global = ctx.config.global.clone();

    match key {
        "default_branch" => {
            RefName::new(format!("refs/heads/{value}")).context("Invalid branch name")?;
            global.default_branch = Some(value.to_string());
        }
        "keep_notes" => {
            let parsed: bool = value.parse().context("Expected 'true' or 'false'")?;
            global.keep_notes = Some(parsed);
        }
        "output.json" => {
            let parsed: bool = value.parse().context("Expected 'true' or 'false'")?;
            let mut defaults = global.output.unwrap_or_default();
            defaults.json = Some(parsed);
            global.output = Some(defaults);
        }
        _ => bail!("Unknown configuration key: {}", key),
    }

    let path = Config::write_global(&global).context("Failed to write config")?;
    output::print(
        format!("Set {} = {} in {}", key, value, path.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    match ctx.config.path() {
        Some(path) => println!("# Configuration ({})", path.display()),
        None => println!("# Configuration (defaults)"),
    }
    println!("default_branch = {}", ctx.config.default_branch());
    println!("keep_notes = {}", ctx.config.keep_notes());
    println!("output.json = {}", ctx.config.json_default());
    Ok(())
}
