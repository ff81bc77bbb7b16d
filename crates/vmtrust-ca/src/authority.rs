//! Certificate authority resolution.
//!
//! CA material lives in a keyset tree:
//!
//! ```text
//! <keys_dir>/<keyset>/<ca-name>/cert.pem
//! <keys_dir>/<keyset>/<ca-name>/privkey.pem
//! ```
//!
//! This crate never creates or rotates CAs; it only loads them.

use rcgen::{Certificate, CertificateParams, KeyPair};
use std::path::{Path, PathBuf};
use tracing::debug;
use vmtrust_core::paths::is_single_component;
use vmtrust_core::{TrustPaths, CERT_FILE, PRIVKEY_FILE};
use x509_parser::pem::parse_x509_pem;

use crate::{CaError, Result};

/// A CA certificate and its private key, ready to sign.
pub struct CaMaterial {
    certificate: Certificate,
    key_pair: KeyPair,
    subject: String,
}

impl CaMaterial {
    /// Parse PEM-encoded CA material.
    ///
    /// The paths are only used to attribute parse errors.
    pub fn from_pem(
        cert_pem: &str,
        key_pem: &str,
        cert_path: &Path,
        key_path: &Path,
    ) -> Result<Self> {
        let key_pair = KeyPair::from_pem(key_pem).map_err(|e| CaError::malformed(key_path, e))?;

        let (_, pem_block) =
            parse_x509_pem(cert_pem.as_bytes()).map_err(|e| CaError::malformed(cert_path, e))?;
        if pem_block.label != "CERTIFICATE" {
            return Err(CaError::malformed(
                cert_path,
                format!("expected CERTIFICATE block, got {}", pem_block.label),
            ));
        }
        let parsed = pem_block
            .parse_x509()
            .map_err(|e| CaError::malformed(cert_path, e))?;

        let cert_public_key = parsed
            .tbs_certificate
            .subject_pki
            .subject_public_key
            .data
            .as_ref();
        if cert_public_key != key_pair.public_key_raw() {
            return Err(CaError::malformed(
                key_path,
                format!("private key does not match {}", cert_path.display()),
            ));
        }
        let subject = parsed.subject().to_string();

        let params = CertificateParams::from_ca_cert_pem(cert_pem)
            .map_err(|e| CaError::malformed(cert_path, e))?;
        let certificate = params
            .self_signed(&key_pair)
            .map_err(|e| CaError::malformed(cert_path, e))?;

        Ok(Self {
            certificate,
            key_pair,
            subject,
        })
    }

    /// Issuer certificate used when signing.
    pub const fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Issuer private key.
    pub const fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Subject DN of the CA certificate.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl std::fmt::Debug for CaMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaMaterial")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Source of CA material, keyed by CA name and keyset.
pub trait CaProvider {
    /// Resolve the named CA within `keyset`.
    fn resolve(&self, ca_name: &str, keyset: &str) -> Result<CaMaterial>;
}

/// CA provider reading PEM files from a keyset directory tree.
#[derive(Debug, Clone)]
pub struct KeysetCaProvider {
    keys_dir: PathBuf,
}

impl KeysetCaProvider {
    pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
        Self {
            keys_dir: keys_dir.into(),
        }
    }

    /// Provider over `<trust_dir>/keys`.
    pub fn from_paths(paths: &TrustPaths) -> Self {
        Self::new(paths.keys_dir())
    }

    /// Directory expected to hold the CA's PEM files.
    pub fn ca_dir(&self, ca_name: &str, keyset: &str) -> PathBuf {
        self.keys_dir.join(keyset).join(ca_name)
    }
}

impl CaProvider for KeysetCaProvider {
    fn resolve(&self, ca_name: &str, keyset: &str) -> Result<CaMaterial> {
        if !is_single_component(keyset) {
            return Err(CaError::NotFound(format!("invalid keyset name {keyset:?}")));
        }
        if !is_single_component(ca_name) {
            return Err(CaError::NotFound(format!("invalid CA name {ca_name:?}")));
        }

        let keyset_dir = self.keys_dir.join(keyset);
        if !keyset_dir.is_dir() {
            return Err(CaError::NotFound(format!(
                "keyset {keyset} in {}",
                self.keys_dir.display()
            )));
        }

        let ca_dir = self.ca_dir(ca_name, keyset);
        let cert_path = ca_dir.join(CERT_FILE);
        let key_path = ca_dir.join(PRIVKEY_FILE);
        debug!(ca = ca_name, keyset, dir = %ca_dir.display(), "loading CA material");

        let cert_pem = read_pem(&cert_path)?;
        let key_pem = read_pem(&key_path)?;

        CaMaterial::from_pem(&cert_pem, &key_pem, &cert_path, &key_path)
    }
}

fn read_pem(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CaError::NotFound(path.display().to_string())
        } else {
            CaError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}
