//! # vmtrust-core
//!
//! Shared types for issuing per-VM SUDI credentials: the error enum, the
//! trust-material layout, VM configuration lookup, identifiers and the
//! certificate template.

pub mod error;
pub mod identity;
pub mod paths;
pub mod template;
pub mod vm;

pub use error::{Result, TrustError};
pub use identity::{read_product_id, MachineId, ProductId};
pub use paths::{TrustPaths, CERT_FILE, DEFAULT_KEYSET, PRIVKEY_FILE, SUDI_CA_NAME};
pub use template::{sudi_not_after, CertificateTemplate, ExtendedKeyUsage, KeyUsage};
pub use vm::{ConfigDirRegistry, VmRegistry};
