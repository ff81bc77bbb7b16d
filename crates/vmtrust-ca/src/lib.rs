//! # vmtrust-ca
//!
//! Certificate authority side of SUDI issuance.
//!
//! ## Architecture
//!
//! ```text
//! keyset tree (<trust_dir>/keys)
//!        │
//!        └── CaProvider::resolve("sudi-ca", keyset) ──► CaMaterial
//!                                                          │
//! CertificateTemplate ──► CredentialSigner::sign ◄─────────┘
//!                                │
//!                                └── <sudi_dir>/<vm>/{privkey,cert}.pem
//! ```
//!
//! Both seams are traits so a hardware-backed CA or signer can be dropped in
//! without touching the issuance workflow.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vmtrust_ca::{CaProvider, CredentialSigner, KeysetCaProvider, RcgenSigner};
//!
//! let ca = KeysetCaProvider::from_paths(&paths).resolve("sudi-ca", "default")?;
//! RcgenSigner::new().sign(&template, &ca, &paths.sudi_path("vm1"))?;
//! ```

mod authority;
mod error;
mod inspect;
mod signer;

pub use authority::{CaMaterial, CaProvider, KeysetCaProvider};
pub use error::{CaError, Result};
pub use inspect::{inspect_credential, CredentialSummary};
pub use signer::{params_from_template, CredentialSigner, RcgenSigner};
