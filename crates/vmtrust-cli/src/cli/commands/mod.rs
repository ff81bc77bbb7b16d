//! Command implementations.

pub mod config;
pub mod sudi;

use std::path::PathBuf;
use vmtrust::TrustPaths;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved directory layout
    pub paths: TrustPaths,

    /// Keyset used when none is given
    pub keyset: String,

    /// Output format
    pub output_format: OutputFormat,

    /// Config file in use
    pub config_path: PathBuf,

    /// Loaded configuration
    pub config: Config,
}
