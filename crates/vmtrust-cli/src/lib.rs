//! # vmtrust-cli
//!
//! Command-line interface for issuing and inspecting per-VM SUDI credentials.
//!
//! - `vmtrust sudi new <vm>` issues a key and certificate signed by the
//!   keyset's `sudi-ca`
//! - `vmtrust sudi show <vm>` prints the issued certificate's identity fields
//! - `vmtrust config` manages the directory layout defaults

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
