//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Issue per-VM SUDI device-identity credentials
///
/// Each VM gets a private key and a certificate signed by the keyset's
/// sudi-ca, with the host's product id and a fresh machine id in the subject.
#[derive(Parser, Debug)]
#[command(name = "vmtrust")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, env = "VMTRUST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Trust material root directory
    #[arg(long, env = "VMTRUST_TRUST_DIR", global = true)]
    pub trust_dir: Option<PathBuf>,

    /// SUDI credential storage directory
    #[arg(long, env = "VMTRUST_SUDI_DIR", global = true)]
    pub sudi_dir: Option<PathBuf>,

    /// VM configuration directory
    #[arg(long, env = "VMTRUST_MACHINES_DIR", global = true)]
    pub machines_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and inspect SUDI credentials
    Sudi(SudiArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Sudi command
// ============================================================================

#[derive(Args, Debug)]
pub struct SudiArgs {
    #[command(subcommand)]
    pub command: SudiCommands,
}

#[derive(Subcommand, Debug)]
pub enum SudiCommands {
    /// Generate a SUDI key and certificate for a VM
    New {
        /// VM name
        vm: String,

        /// Keyset whose sudi-ca signs the certificate
        #[arg(short, long)]
        keyset: Option<String>,
    },

    /// Show the identity fields of a VM's SUDI certificate
    Show {
        /// VM name
        vm: String,
    },
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },

    /// Show the config file path
    Path,
}
