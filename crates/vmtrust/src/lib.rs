//! Per-VM SUDI device-identity credentials.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vmtrust::{issue_sudi, TrustPaths};
//!
//! let paths = TrustPaths::under(std::path::Path::new("/var/lib/machine"));
//! let issued = issue_sudi(&paths, "vm1", "default")?;
//! println!("saved in {}", issued.dir.display());
//! ```
//!
//! The workflow lives in [`SudiIssuer`]; [`issue_sudi`] wires it to the
//! filesystem-backed registry, keyset CA provider and rcgen signer.

mod sudi;

pub use sudi::{issue_sudi, IssuedCredential, SudiIssuer};

// Re-export core types
pub use vmtrust_core::*;

// Re-export CA side
pub use vmtrust_ca::{
    inspect_credential, CaError, CaMaterial, CaProvider, CredentialSigner, CredentialSummary,
    KeysetCaProvider, RcgenSigner,
};
