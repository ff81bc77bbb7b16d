//! `vmtrust config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(ctx, &key, &value),
        ConfigCommands::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "config_file": ctx.config_path,
                "paths": ctx.paths,
                "default_keyset": ctx.keyset,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Effective Configuration:".bold());
            println!();
            println!("  {} {}", "config_file:".bold(), ctx.config_path.display());
            println!("  {} {}", "trust_dir:".bold(), ctx.paths.trust_dir.display());
            println!("  {} {}", "sudi_dir:".bold(), ctx.paths.sudi_dir.display());
            println!("  {} {}", "machines_dir:".bold(), ctx.paths.machines_dir.display());
            println!("  {} {}", "default_keyset:".bold(), ctx.keyset);
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();

    match key {
        "trust_dir" => config.trust_dir = Some(PathBuf::from(value)),
        "sudi_dir" => config.sudi_dir = Some(PathBuf::from(value)),
        "machines_dir" => config.machines_dir = Some(PathBuf::from(value)),
        "default_keyset" | "keyset" => config.default_keyset = Some(value.to_string()),
        "output_format" | "output" => config.output_format = Some(value.parse()?),
        _ => {
            anyhow::bail!(
                "Unknown config key: {}\n\n\
                 Available keys:\n  \
                 trust_dir      - Trust material root\n  \
                 sudi_dir       - SUDI credential storage root\n  \
                 machines_dir   - VM configuration root\n  \
                 default_keyset - Keyset used without --keyset\n  \
                 output_format  - Default output format (pretty/json)",
                key
            );
        }
    }

    config.save(&ctx.config_path)?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}
