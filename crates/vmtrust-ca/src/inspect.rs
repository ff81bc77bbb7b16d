//! Read back an issued credential.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmtrust_core::{ExtendedKeyUsage, KeyUsage, CERT_FILE};

use crate::{CaError, Result};

/// X.520 `serialNumber` attribute type, dotted form.
const SERIAL_NUMBER_OID: &str = "2.5.4.5";

/// Fields of an issued SUDI certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSummary {
    /// Credential storage directory
    pub dir: PathBuf,
    /// Subject common name (the machine identifier)
    pub common_name: Option<String>,
    /// Subject serialNumber attribute
    pub serial_number: Option<String>,
    /// Issuer distinguished name
    pub issuer: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    pub key_usages: Vec<KeyUsage>,
    pub extended_key_usages: Vec<ExtendedKeyUsage>,
}

impl CredentialSummary {
    /// Product identifier parsed out of `PID:<product> SN:<machine>`.
    pub fn product_id(&self) -> Option<&str> {
        let rest = self.serial_number.as_deref()?.strip_prefix("PID:")?;
        rest.rsplit_once(" SN:").map(|(pid, _)| pid)
    }

    /// Machine identifier parsed out of `PID:<product> SN:<machine>`.
    pub fn machine_id(&self) -> Option<&str> {
        self.serial_number
            .as_deref()?
            .rsplit_once(" SN:")
            .map(|(_, sn)| sn)
    }
}

/// Parse `<dir>/cert.pem`.
pub fn inspect_credential(dir: &Path) -> Result<CredentialSummary> {
    let path = dir.join(CERT_FILE);
    let content = std::fs::read(&path).map_err(|e| CaError::io(&path, e))?;

    let block = pem::parse(&content).map_err(|e| CaError::malformed(&path, e))?;
    if block.tag() != "CERTIFICATE" {
        return Err(CaError::malformed(
            &path,
            format!("expected CERTIFICATE block, got {}", block.tag()),
        ));
    }

    let (_, cert) = x509_parser::parse_x509_certificate(block.contents())
        .map_err(|e| CaError::malformed(&path, e))?;

    let subject = cert.subject();
    let common_name = subject
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string);
    let serial_number = subject
        .iter_attributes()
        .find(|attr| attr.attr_type().to_id_string() == SERIAL_NUMBER_OID)
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string);

    let mut key_usages = Vec::new();
    if let Ok(Some(ku)) = cert.key_usage() {
        if ku.value.digital_signature() {
            key_usages.push(KeyUsage::DigitalSignature);
        }
        if ku.value.key_encipherment() {
            key_usages.push(KeyUsage::KeyEncipherment);
        }
        if ku.value.data_encipherment() {
            key_usages.push(KeyUsage::DataEncipherment);
        }
    }

    let mut extended_key_usages = Vec::new();
    if let Ok(Some(eku)) = cert.extended_key_usage() {
        if eku.value.server_auth {
            extended_key_usages.push(ExtendedKeyUsage::ServerAuth);
        }
        if eku.value.client_auth {
            extended_key_usages.push(ExtendedKeyUsage::ClientAuth);
        }
    }

    Ok(CredentialSummary {
        dir: dir.to_path_buf(),
        common_name,
        serial_number,
        issuer: cert.issuer().to_string(),
        not_before: asn1_to_utc(cert.validity().not_before, &path)?,
        not_after: asn1_to_utc(cert.validity().not_after, &path)?,
        key_usages,
        extended_key_usages,
    })
}

fn asn1_to_utc(t: x509_parser::time::ASN1Time, path: &Path) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .ok_or_else(|| CaError::malformed(path, "validity timestamp out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::tests::install_test_ca;
    use crate::{CaProvider, CredentialSigner, KeysetCaProvider, RcgenSigner};
    use chrono::SecondsFormat;
    use tempfile::tempdir;
    use vmtrust_core::{CertificateTemplate, MachineId, ProductId};

    #[test]
    fn test_inspect_signed_credential() {
        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        install_test_ca(keys.path(), "default", "sudi-ca");
        let ca = KeysetCaProvider::new(keys.path())
            .resolve("sudi-ca", "default")
            .unwrap();

        let machine = MachineId::generate();
        let template = CertificateTemplate::new(&ProductId::new("host-42"), machine);
        RcgenSigner::new().sign(&template, &ca, out.path()).unwrap();

        let summary = inspect_credential(out.path()).unwrap();
        let machine = machine.to_string();
        assert_eq!(summary.common_name.as_deref(), Some(machine.as_str()));
        assert_eq!(
            summary.serial_number.as_deref(),
            Some(format!("PID:host-42 SN:{machine}").as_str())
        );
        assert_eq!(summary.product_id(), Some("host-42"));
        assert_eq!(summary.machine_id(), Some(machine.as_str()));
        assert!(summary.issuer.contains("Test SUDI CA"));
        assert_eq!(
            summary.not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            "2099-12-31T23:00:00Z"
        );
        assert_eq!(summary.not_before.timestamp(), template.not_before.timestamp());
        assert_eq!(summary.key_usages, template.key_usages);
        assert_eq!(summary.extended_key_usages, template.extended_key_usages);
    }

    #[test]
    fn test_inspect_missing_cert() {
        let dir = tempdir().unwrap();
        let err = inspect_credential(dir.path()).unwrap_err();
        assert!(matches!(err, CaError::Io { .. }));
    }

    #[test]
    fn test_inspect_garbage() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CERT_FILE), "garbage").unwrap();
        let err = inspect_credential(dir.path()).unwrap_err();
        assert!(matches!(err, CaError::Malformed { .. }));
    }
}
