//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let paths = config.resolve_paths(cli.trust_dir, cli.sudi_dir, cli.machines_dir)?;
    debug!(
        config_file = %config_path.display(),
        trust_dir = %paths.trust_dir.display(),
        sudi_dir = %paths.sudi_dir.display(),
        machines_dir = %paths.machines_dir.display(),
        "resolved configuration"
    );
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or_default();

    // Create context for commands
    let ctx = commands::Context {
        paths,
        keyset: config.keyset().to_string(),
        output_format,
        config_path,
        config,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Sudi(args) => commands::sudi::execute(&ctx, args),
        Commands::Config(args) => commands::config::execute(&ctx, args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
