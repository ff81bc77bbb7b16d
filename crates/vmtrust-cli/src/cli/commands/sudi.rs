//! `vmtrust sudi` - SUDI credential issuance and inspection.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::{SudiArgs, SudiCommands};
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: SudiArgs) -> Result<()> {
    match args.command {
        SudiCommands::New { vm, keyset } => new_sudi(ctx, &vm, keyset.as_deref()),
        SudiCommands::Show { vm } => show_sudi(ctx, &vm),
    }
}

fn new_sudi(ctx: &Context, vm: &str, keyset: Option<&str>) -> Result<()> {
    let keyset = keyset.unwrap_or(&ctx.keyset);
    let issued = vmtrust::issue_sudi(&ctx.paths, vm, keyset)?;

    match ctx.output_format {
        OutputFormat::Json => {
            let out = json!({
                "vm": issued.vm,
                "keyset": keyset,
                "dir": issued.dir,
                "machine_id": issued.machine_id,
                "product_id": issued.product_id,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => {
            println!(
                "Generated sudi key and cert saved in {} directory",
                issued.dir.display()
            );
        }
    }

    Ok(())
}

fn show_sudi(ctx: &Context, vm: &str) -> Result<()> {
    if !vmtrust::paths::is_single_component(vm) {
        anyhow::bail!("invalid VM name {vm:?}");
    }

    let dir = ctx.paths.sudi_path(vm);
    if !dir.join(vmtrust::CERT_FILE).exists() {
        anyhow::bail!("no sudi cert for {vm} in {}", dir.display());
    }
    let summary = vmtrust::inspect_credential(&dir)?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Pretty => {
            let unset = || "(none)".dimmed().to_string();
            println!("{} {}", "SUDI credential for".bold(), vm.cyan());
            println!();
            println!("  {} {}", "directory:".bold(), summary.dir.display());
            println!(
                "  {} {}",
                "serial number:".bold(),
                summary.serial_number.clone().unwrap_or_else(unset)
            );
            println!(
                "  {} {}",
                "common name:".bold(),
                summary.common_name.clone().unwrap_or_else(unset)
            );
            println!("  {} {}", "issuer:".bold(), summary.issuer);
            println!("  {} {}", "not before:".bold(), summary.not_before.to_rfc3339());
            println!("  {} {}", "not after:".bold(), summary.not_after.to_rfc3339());
        }
    }

    Ok(())
}
