//! Signs SUDI templates and persists the resulting key and certificate.

use chrono::{DateTime, Utc};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, DnValue, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose, PrintableString, SerialNumber,
};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, warn};
use vmtrust_core::{CertificateTemplate, ExtendedKeyUsage, KeyUsage, CERT_FILE, PRIVKEY_FILE};

use crate::{CaError, CaMaterial, Result};

/// X.520 `serialNumber` attribute type.
const SERIAL_NUMBER_OID: &[u64] = &[2, 5, 4, 5];

const KEY_FILE_MODE: u32 = 0o600;
const CERT_FILE_MODE: u32 = 0o644;

/// Turns a template into a signed credential on disk.
pub trait CredentialSigner {
    /// Sign `template` with `ca` and write `privkey.pem` and `cert.pem`
    /// into `out_dir`. Existing files are never overwritten.
    fn sign(&self, template: &CertificateTemplate, ca: &CaMaterial, out_dir: &Path) -> Result<()>;
}

/// Signer generating an ECDSA P-256 key per credential with rcgen.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcgenSigner;

impl RcgenSigner {
    pub const fn new() -> Self {
        Self
    }

    /// Generate a key and sign the template, returning `(cert_pem, key_pem)`.
    pub fn sign_to_pem(
        &self,
        template: &CertificateTemplate,
        ca: &CaMaterial,
    ) -> Result<(String, String)> {
        let key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256)?;
        let params = params_from_template(template)?;
        let cert = params.signed_by(&key, ca.certificate(), ca.key_pair())?;
        Ok((cert.pem(), key.serialize_pem()))
    }
}

impl CredentialSigner for RcgenSigner {
    fn sign(&self, template: &CertificateTemplate, ca: &CaMaterial, out_dir: &Path) -> Result<()> {
        let (cert_pem, key_pem) = self.sign_to_pem(template, ca)?;

        let key_path = out_dir.join(PRIVKEY_FILE);
        let cert_path = out_dir.join(CERT_FILE);

        write_new(&key_path, key_pem.as_bytes(), KEY_FILE_MODE)?;
        if let Err(e) = write_new(&cert_path, cert_pem.as_bytes(), CERT_FILE_MODE) {
            if let Err(rm) = fs::remove_file(&key_path) {
                warn!(path = %key_path.display(), error = %rm, "failed to remove private key after write error");
            }
            return Err(e);
        }

        debug!(dir = %out_dir.display(), cn = %template.common_name, "credential written");
        Ok(())
    }
}

/// Map template fields onto rcgen parameters.
pub fn params_from_template(template: &CertificateTemplate) -> Result<CertificateParams> {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, directory_string(&template.common_name));
    dn.push(
        DnType::CustomDnType(SERIAL_NUMBER_OID.to_vec()),
        directory_string(&template.subject_serial_number),
    );
    params.distinguished_name = dn;

    params.is_ca = IsCa::NoCa;
    params.use_authority_key_identifier_extension = true;
    params.not_before = offset_time(template.not_before)?;
    params.not_after = offset_time(template.not_after)?;
    params.serial_number = Some(SerialNumber::from(template.machine_id.as_bytes().to_vec()));

    params.key_usages = template
        .key_usages
        .iter()
        .map(|usage| match usage {
            KeyUsage::DigitalSignature => KeyUsagePurpose::DigitalSignature,
            KeyUsage::KeyEncipherment => KeyUsagePurpose::KeyEncipherment,
            KeyUsage::DataEncipherment => KeyUsagePurpose::DataEncipherment,
        })
        .collect();
    params.extended_key_usages = template
        .extended_key_usages
        .iter()
        .map(|usage| match usage {
            ExtendedKeyUsage::ServerAuth => ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsage::ClientAuth => ExtendedKeyUsagePurpose::ClientAuth,
        })
        .collect();

    Ok(params)
}

/// PrintableString when the value allows it, UTF8String otherwise.
fn directory_string(value: &str) -> DnValue {
    PrintableString::try_from(value).map_or_else(
        |_| DnValue::Utf8String(value.to_string()),
        DnValue::PrintableString,
    )
}

fn offset_time(at: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map_err(|e| CaError::Template(format!("timestamp {at} out of range: {e}")))
}

/// Create `path` exclusively and write `contents` to it.
fn write_new(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let mut file = create_new(path, mode).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            CaError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            CaError::io(path, e)
        }
    })?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .map_err(|e| CaError::io(path, e))
}

#[cfg(unix)]
fn create_new(path: &Path, mode: u32) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn create_new(path: &Path, _mode: u32) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::tests::install_test_ca;
    use crate::{CaProvider, KeysetCaProvider};
    use tempfile::tempdir;
    use vmtrust_core::{MachineId, ProductId};

    fn template() -> CertificateTemplate {
        CertificateTemplate::new(&ProductId::new("host-01"), MachineId::generate())
    }

    fn test_ca(keys_dir: &Path) -> CaMaterial {
        install_test_ca(keys_dir, "default", "sudi-ca");
        KeysetCaProvider::new(keys_dir)
            .resolve("sudi-ca", "default")
            .unwrap()
    }

    #[test]
    fn test_sign_writes_both_files() {
        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        let ca = test_ca(keys.path());

        RcgenSigner::new().sign(&template(), &ca, out.path()).unwrap();

        let key = fs::read_to_string(out.path().join(PRIVKEY_FILE)).unwrap();
        let cert = fs::read_to_string(out.path().join(CERT_FILE)).unwrap();
        assert!(key.contains("PRIVATE KEY"));
        assert!(cert.contains("BEGIN CERTIFICATE"));
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_mode() {
        use std::os::unix::fs::PermissionsExt;

        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        let ca = test_ca(keys.path());

        RcgenSigner::new().sign(&template(), &ca, out.path()).unwrap();

        let mode = fs::metadata(out.path().join(PRIVKEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_refuses_existing_key() {
        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        let ca = test_ca(keys.path());
        fs::write(out.path().join(PRIVKEY_FILE), "old key").unwrap();

        let err = RcgenSigner::new()
            .sign(&template(), &ca, out.path())
            .unwrap_err();

        assert!(matches!(err, CaError::AlreadyExists { .. }));
        assert_eq!(
            fs::read_to_string(out.path().join(PRIVKEY_FILE)).unwrap(),
            "old key"
        );
        assert!(!out.path().join(CERT_FILE).exists());
    }

    #[test]
    fn test_existing_cert_leaves_no_lone_key() {
        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        let ca = test_ca(keys.path());
        fs::write(out.path().join(CERT_FILE), "old cert").unwrap();

        let err = RcgenSigner::new()
            .sign(&template(), &ca, out.path())
            .unwrap_err();

        assert!(matches!(err, CaError::AlreadyExists { .. }));
        assert!(!out.path().join(PRIVKEY_FILE).exists());
        assert_eq!(
            fs::read_to_string(out.path().join(CERT_FILE)).unwrap(),
            "old cert"
        );
    }

    #[test]
    fn test_missing_output_dir_is_io_error() {
        let keys = tempdir().unwrap();
        let out = tempdir().unwrap();
        let ca = test_ca(keys.path());

        let err = RcgenSigner::new()
            .sign(&template(), &ca, &out.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, CaError::Io { .. }));
    }

    #[test]
    fn test_leaf_names_issuer_key() {
        use x509_parser::extensions::ParsedExtension;
        use x509_parser::pem::parse_x509_pem;

        let keys = tempdir().unwrap();
        let ca = test_ca(keys.path());
        let (cert_pem, _) = RcgenSigner::new().sign_to_pem(&template(), &ca).unwrap();

        let ca_pem = fs::read(keys.path().join("default/sudi-ca").join(CERT_FILE)).unwrap();
        let (_, ca_block) = parse_x509_pem(&ca_pem).unwrap();
        let ca_cert = ca_block.parse_x509().unwrap();
        let ca_ski = ca_cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(ki) => Some(ki.0.to_vec()),
                _ => None,
            })
            .expect("CA has a subject key identifier");

        let (_, leaf_block) = parse_x509_pem(cert_pem.as_bytes()).unwrap();
        let leaf = leaf_block.parse_x509().unwrap();
        let aki = leaf
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|ki| ki.0.to_vec())
                }
                _ => None,
            })
            .expect("leaf has an authority key identifier");

        assert_eq!(aki, ca_ski);
        assert_eq!(leaf.issuer().as_raw(), ca_cert.subject().as_raw());
    }

    #[test]
    fn test_directory_string_fallback() {
        assert!(matches!(
            directory_string("PID:abc SN:def"),
            DnValue::PrintableString(_)
        ));
        assert!(matches!(
            directory_string("PID:abc\n SN:def"),
            DnValue::Utf8String(_)
        ));
    }
}
