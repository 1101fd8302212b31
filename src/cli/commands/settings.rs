//! Effective configuration.

use anyhow::Context as _;

use super::Context;
use crate::config;

/// Print the configuration in effect, optionally saving it.
pub fn cmd_config(ctx: &Context, save: bool) -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory on this system"),
    }
    println!("{}", toml::to_string_pretty(&ctx.config)?);

    if save {
        let path = config::save(&ctx.config).context("cannot save config")?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
