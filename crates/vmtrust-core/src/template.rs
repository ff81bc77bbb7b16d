//! SUDI certificate template.
//!
//! The template only describes field values. Turning it into a signed
//! certificate is the signer's job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{MachineId, ProductId};

/// `2099-12-31T23:00:00Z` as seconds since the Unix epoch.
const NOT_AFTER_UNIX: i64 = 4_102_441_200;

/// Fixed expiry stamped on every SUDI certificate.
pub fn sudi_not_after() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(NOT_AFTER_UNIX)
}

/// Key usage bits requested for the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyUsage {
    DigitalSignature,
    KeyEncipherment,
    DataEncipherment,
}

/// Extended key usage purposes requested for the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedKeyUsage {
    ServerAuth,
    ClientAuth,
}

/// Field values for a SUDI certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateTemplate {
    /// Subject `serialNumber` attribute: `PID:<product> SN:<machine>`.
    pub subject_serial_number: String,
    /// Subject `commonName` attribute: the machine identifier.
    pub common_name: String,
    /// Machine identifier the subject was built from.
    pub machine_id: MachineId,
    /// Start of validity.
    pub not_before: DateTime<Utc>,
    /// End of validity, always [`sudi_not_after`].
    pub not_after: DateTime<Utc>,
    pub key_usages: Vec<KeyUsage>,
    pub extended_key_usages: Vec<ExtendedKeyUsage>,
}

impl CertificateTemplate {
    /// Build a template valid from `issued_at`.
    pub fn at(product: &ProductId, machine: MachineId, issued_at: DateTime<Utc>) -> Self {
        Self {
            subject_serial_number: format!("PID:{product} SN:{machine}"),
            common_name: machine.to_string(),
            machine_id: machine,
            not_before: issued_at,
            not_after: sudi_not_after(),
            key_usages: vec![
                KeyUsage::DigitalSignature,
                KeyUsage::KeyEncipherment,
                KeyUsage::DataEncipherment,
            ],
            extended_key_usages: vec![ExtendedKeyUsage::ServerAuth, ExtendedKeyUsage::ClientAuth],
        }
    }

    /// Build a template valid from now.
    pub fn new(product: &ProductId, machine: MachineId) -> Self {
        Self::at(product, machine, Utc::now())
    }
}
